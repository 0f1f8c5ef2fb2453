use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::color::{Color, ColorParseError};
use super::shape::CanvasShape;

/// An accepted placement. This is also exactly what viewers receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
	pub x: u32,
	pub y: u32,
	pub color: Color,
	pub user: String,
	pub time: u64,
}

impl Placement {
	/// The key a placement is logged under.
	pub fn coordinate(&self) -> String {
		coordinate(self.x, self.y)
	}
}

pub fn coordinate(x: u32, y: u32) -> String {
	format!("{},{}", x, y)
}

#[derive(Debug, Error)]
pub enum RequestError {
	#[error("malformed placement: {0}")]
	Malformed(#[from] serde_json::Error),
	#[error("invalid color: {0}")]
	InvalidColor(#[from] ColorParseError),
	#[error("pixel ({x}, {y}) is outside the canvas")]
	OutOfBounds { x: u32, y: u32 },
}

/// A placement as submitted, before any validation beyond its structure.
#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
	pub x: u32,
	pub y: u32,
	pub color: String,
	#[serde(default)]
	pub user: String,
}

impl PlacementRequest {
	pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
		serde_json::from_slice(body).map_err(RequestError::from)
	}

	pub fn from_value(value: serde_json::Value) -> Result<Self, RequestError> {
		serde_json::from_value(value).map_err(RequestError::from)
	}

	/// Checks everything that can be checked without touching a store.
	pub fn validate(
		self,
		shape: &CanvasShape,
	) -> Result<ValidPlacement, RequestError> {
		let color = self.color.parse::<Color>()?;

		if !shape.contains(self.x, self.y) {
			return Err(RequestError::OutOfBounds { x: self.x, y: self.y });
		}

		Ok(ValidPlacement {
			x: self.x,
			y: self.y,
			color,
			user: self.user,
		})
	}
}

/// A structurally valid placement that has not been timestamped yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPlacement {
	pub x: u32,
	pub y: u32,
	pub color: Color,
	pub user: String,
}

impl ValidPlacement {
	pub fn accept(self, time: u64) -> Placement {
		let Self { x, y, color, user } = self;
		Placement { x, y, color, user, time }
	}
}

/// Wall-clock milliseconds that never go backwards within the process.
#[derive(Debug, Default)]
pub struct Clock {
	last: AtomicU64,
}

impl Clock {
	pub fn now(&self) -> u64 {
		let wall = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|duration| duration.as_millis() as u64)
			.unwrap_or(0);

		let previous = self.last.fetch_max(wall, Ordering::SeqCst);
		previous.max(wall)
	}
}
