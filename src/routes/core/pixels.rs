use std::sync::Arc;

use bytes::Bytes;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::board::{Board, PlaceError, PlacementRequest, PlacementResponse};
use crate::filter::resource;

const MAX_BODY: u64 = 4 * 1024;

pub fn post(
	board: Arc<Board>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
	warp::path("pixels")
		.and(warp::path::end())
		.and(warp::post())
		.and(warp::body::content_length_limit(MAX_BODY))
		.and(warp::body::bytes())
		.and(resource::board(board))
		.then(|body: Bytes, board: Arc<Board>| async move {
			match PlacementRequest::parse(&body) {
				Ok(request) => board.submit(request).await.into_response(),
				Err(err) => err.into_response(),
			}
		})
}

pub fn get(
	board: Arc<Board>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
	warp::path!("pixels" / u32 / u32)
		.and(warp::get())
		.and(resource::board(board))
		.then(|x: u32, y: u32, board: Arc<Board>| async move {
			match board.lookup(x, y).await {
				Ok(Some(placement)) => warp::reply::json(&placement).into_response(),
				Ok(None) => StatusCode::NOT_FOUND.into_response(),
				Err(err) => {
					let err = PlaceError::PersistFailed(err);
					PlacementResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, &err)
						.into_response()
				},
			}
		})
}
