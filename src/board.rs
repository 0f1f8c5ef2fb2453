mod canvas;
mod color;
mod fanout;
mod placement;
mod placement_log;
mod registry;
mod shape;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{error, trace, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::time::error::Elapsed;
use tokio::time::Instant;
use warp::http::StatusCode;
use warp::{reply::Response, Reply};

pub use canvas::{Canvas, CanvasError, CanvasStore};
pub use color::Color;
pub use fanout::{DeliveryError, Fanout, PushChannel};
pub use placement_log::{LogError, PlacementLog};
pub use placement::{coordinate, Clock, Placement, PlacementRequest, RequestError};
pub use registry::{ConnectionRegistry, RegistryError};
pub use shape::CanvasShape;

#[derive(Debug, Error)]
pub enum PlaceError {
	#[error("fail to connect board db with error: {0}")]
	PersistFailed(LogError),
	#[error("fail to connect redis cache with error: {0}")]
	CanvasFailed(CanvasError),
	#[error("fail to connect connection db with error: {0}")]
	RegistryFailed(RegistryError),
}

impl Reply for RequestError {
	fn into_response(self) -> Response {
		PlacementResponse::failure(StatusCode::BAD_REQUEST, &self)
			.into_response()
	}
}

/// The body returned to whoever submitted a placement.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResponse {
	pub status_code: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl PlacementResponse {
	pub fn ok() -> Self {
		Self { status_code: StatusCode::OK.as_u16(), message: None }
	}

	pub fn failure(
		status: StatusCode,
		cause: &dyn std::error::Error,
	) -> Self {
		Self {
			status_code: status.as_u16(),
			message: Some(cause.to_string()),
		}
	}

	pub fn status(&self) -> StatusCode {
		StatusCode::from_u16(self.status_code)
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
	}
}

impl Reply for PlacementResponse {
	fn into_response(self) -> Response {
		let status = self.status();
		warp::reply::with_status(warp::reply::json(&self), status)
			.into_response()
	}
}

/// Where a placement is in its trip through the stores.
///
/// Failures leave the machine early as a [`PlaceError`].
#[derive(Debug)]
enum Stage {
	Received,
	Persisted,
	CanvasUpdated,
	Broadcast(Vec<String>),
	Done,
}

/// Runs one external call against the deadline of the request it serves.
async fn within<F, T, E>(
	deadline: Instant,
	future: F,
) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
	E: From<Elapsed>,
{
	tokio::time::timeout_at(deadline, future).await?
}

pub struct Board {
	log: Arc<dyn PlacementLog>,
	canvas: Canvas,
	registry: Arc<dyn ConnectionRegistry>,
	fanout: Fanout,
	clock: Clock,
	deadline: Duration,
}

impl Board {
	pub fn new(
		log: Arc<dyn PlacementLog>,
		canvas: Canvas,
		registry: Arc<dyn ConnectionRegistry>,
		fanout: Fanout,
		deadline: Duration,
	) -> Self {
		Self {
			log,
			canvas,
			registry,
			fanout,
			clock: Clock::default(),
			deadline,
		}
	}

	pub fn shape(&self) -> &CanvasShape {
		self.canvas.shape()
	}

	pub fn background(&self) -> &Color {
		self.canvas.background()
	}

	/// Validates and runs a submitted placement, producing the caller's
	/// response either way.
	pub async fn submit(&self, request: PlacementRequest) -> PlacementResponse {
		let placement = match request.validate(self.shape()) {
			Ok(placement) => placement.accept(self.clock.now()),
			Err(err) => {
				return PlacementResponse::failure(StatusCode::BAD_REQUEST, &err);
			},
		};

		let deadline = Instant::now() + self.deadline;
		match self.try_place(placement, deadline).await {
			Ok(_) => PlacementResponse::ok(),
			Err(err) => {
				PlacementResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, &err)
			},
		}
	}

	/// Persists, paints, and broadcasts an accepted placement, in that order.
	///
	/// A failing stage stops everything after it. Delivery to individual
	/// viewers never fails the placement. Every store call shares `deadline`.
	pub async fn try_place(
		&self,
		placement: Placement,
		deadline: Instant,
	) -> Result<Placement, PlaceError> {
		let mut stage = Stage::Received;

		loop {
			trace!("Placement {} at {:?}", placement.coordinate(), stage);

			stage = match stage {
				Stage::Received => {
					within(deadline, self.log.record(&placement)).await
						.map_err(PlaceError::PersistFailed)
						.inspect_err(|err| error!("{}", err))?;

					Stage::Persisted
				},
				Stage::Persisted => {
					self.update_canvas(&placement, deadline).await
						.map_err(PlaceError::CanvasFailed)
						.inspect_err(|err| error!("{}", err))?;

					Stage::CanvasUpdated
				},
				Stage::CanvasUpdated => {
					let recipients = within(deadline, self.registry.list_active()).await
						.map_err(PlaceError::RegistryFailed)
						.inspect_err(|err| error!("{}", err))?;

					if recipients.is_empty() {
						warn!("No connections to broadcast {} to", placement.coordinate());
					}

					Stage::Broadcast(recipients)
				},
				Stage::Broadcast(recipients) => {
					self.fanout.broadcast(&placement, recipients, deadline).await
						.map_err(|err| RegistryError::Fanout(err.to_string()))
						.map_err(PlaceError::RegistryFailed)
						.inspect_err(|err| error!("{}", err))?;

					Stage::Done
				},
				Stage::Done => return Ok(placement),
			};
		}
	}

	async fn update_canvas(
		&self,
		placement: &Placement,
		deadline: Instant,
	) -> Result<(), CanvasError> {
		within(deadline, self.canvas.ensure_initialized()).await?;
		within(
			deadline,
			self.canvas.set_cell(placement.x, placement.y, &placement.color),
		).await
	}

	pub async fn lookup(
		&self,
		x: u32,
		y: u32,
	) -> Result<Option<Placement>, LogError> {
		within(Instant::now() + self.deadline, self.log.get(x, y)).await
	}

	pub async fn read_canvas(&self) -> Result<bytes::Bytes, CanvasError> {
		within(Instant::now() + self.deadline, self.canvas.read()).await
	}

	/// Rebuilds the canvas from the log. Not bounded by the stage deadline
	/// since it reads the whole log.
	pub async fn restore_canvas(&self) -> Result<usize, RestoreError> {
		let placements = self.log.list().await?;
		self.canvas.restore(&placements).await?;
		Ok(placements.len())
	}
}

#[derive(Debug, Error)]
pub enum RestoreError {
	#[error("could not read placement log: {0}")]
	Log(#[from] LogError),
	#[error("could not write canvas: {0}")]
	Canvas(#[from] CanvasError),
}
