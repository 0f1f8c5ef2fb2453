use std::sync::Arc;

use serde::Serialize;
use warp::http::{header, StatusCode};
use warp::{Filter, Rejection, Reply};

use crate::board::{Board, CanvasShape, Color, PlaceError, PlacementResponse};
use crate::filter::header::accept_encoding;
use crate::filter::resource;

#[derive(Debug, Serialize)]
pub struct CanvasInfo {
	#[serde(flatten)]
	shape: CanvasShape,
	background: Color,
}

/// The whole canvas as ASCII hex digits, gzipped for clients that take it.
pub fn get(
	board: Arc<Board>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
	let canvas = warp::path("canvas")
		.and(warp::path::end())
		.and(warp::get())
		.and(resource::board(board))
		.then(|board: Arc<Board>| async move {
			match board.read_canvas().await {
				Ok(data) => {
					warp::reply::with_header(
						data.to_vec(),
						header::CONTENT_TYPE,
						"application/octet-stream",
					).into_response()
				},
				Err(err) => {
					let err = PlaceError::CanvasFailed(err);
					PlacementResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, &err)
						.into_response()
				},
			}
		});

	accept_encoding::gzip()
		.and(canvas.clone())
		.with(warp::compression::gzip())
		.or(canvas)
}

pub fn info(
	board: Arc<Board>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
	warp::path("canvas")
		.and(warp::path("info"))
		.and(warp::path::end())
		.and(warp::get())
		.and(resource::board(board))
		.map(|board: Arc<Board>| {
			warp::reply::json(&CanvasInfo {
				shape: *board.shape(),
				background: *board.background(),
			})
		})
}
