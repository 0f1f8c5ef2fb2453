use futures_util::future;
use warp::{Filter, Rejection};

fn has_gzip(header: &str) -> bool {
	header.split(',')
		.any(|value| {
			let value = value.split(';').next().unwrap_or("");
			value.trim() == "gzip"
		})
}

/// Passes only requests that accept a gzip body.
pub fn gzip() -> impl Filter<Extract = (), Error = Rejection> + Copy {
	warp::header("accept-encoding")
		.and_then(|header: String| async move {
			has_gzip(&header)
				.then_some(())
				.ok_or_else(warp::reject)
		})
		// a MissingHeader rejection would outrank NotFound and turn an
		// unmatched route into a 400, so every rejection here is NotFound
		.recover(|_| -> future::Ready<Result<_, Rejection>> {
			future::err(warp::reject())
		})
		.unify()
		.untuple_one()
}
