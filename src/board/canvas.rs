use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut, BufMut};
use log::info;
use thiserror::Error;
use tokio::time::error::Elapsed;

use super::color::Color;
use super::placement::Placement;
use super::shape::CanvasShape;

#[derive(Debug, Error)]
pub enum CanvasError {
	#[error("{0}")]
	Unavailable(String),
	#[error("pixel ({x}, {y}) is outside the canvas")]
	OutOfBounds { x: u32, y: u32 },
	#[error("write of {len} bytes at {offset} exceeds the canvas")]
	OutOfRange { offset: usize, len: usize },
	#[error("canvas disappeared before it could be written")]
	Missing,
}

impl From<sea_orm::DbErr> for CanvasError {
	fn from(value: sea_orm::DbErr) -> Self {
		Self::Unavailable(value.to_string())
	}
}

impl From<Elapsed> for CanvasError {
	fn from(_: Elapsed) -> Self {
		Self::Unavailable(String::from("timed out"))
	}
}

/// Backing storage for the single flat canvas buffer.
///
/// Implementations must make `create` all-or-nothing: a reader sees either
/// no canvas or the complete buffer, never a prefix of it.
#[async_trait]
pub trait CanvasStore: Send + Sync {
	async fn exists(&self) -> Result<bool, CanvasError>;

	/// Installs `data` only if no canvas exists yet.
	/// Returns whether this call was the one that installed it.
	async fn create(&self, data: Bytes) -> Result<bool, CanvasError>;

	/// Overwrites `data.len()` bytes in place starting at `offset`.
	async fn write_range(
		&self,
		offset: usize,
		data: &[u8],
	) -> Result<(), CanvasError>;

	async fn read(&self) -> Result<Option<Bytes>, CanvasError>;

	/// Unconditionally installs `data`, replacing any existing canvas.
	async fn replace(&self, data: Bytes) -> Result<(), CanvasError>;
}

pub fn background_buffer(
	shape: &CanvasShape,
	background: &Color,
) -> BytesMut {
	let mut buffer = BytesMut::with_capacity(shape.len());
	for _ in 0..shape.pixels() {
		buffer.put_slice(background.as_bytes());
	}
	buffer
}

pub struct Canvas {
	store: Arc<dyn CanvasStore>,
	shape: CanvasShape,
	background: Color,
}

impl Canvas {
	pub fn new(
		store: Arc<dyn CanvasStore>,
		shape: CanvasShape,
		background: Color,
	) -> Self {
		Self { store, shape, background }
	}

	pub fn shape(&self) -> &CanvasShape {
		&self.shape
	}

	pub fn background(&self) -> &Color {
		&self.background
	}

	// NOTE: racing initializers may each build and submit a buffer; the store
	// keeps whichever lands first and the content is identical either way.
	pub async fn ensure_initialized(&self) -> Result<(), CanvasError> {
		if self.store.exists().await? {
			return Ok(());
		}

		let buffer = background_buffer(&self.shape, &self.background);
		if self.store.create(buffer.freeze()).await? {
			info!(
				"Initialized {}x{} canvas to {}",
				self.shape.width,
				self.shape.height,
				self.background,
			);
		}

		Ok(())
	}

	pub async fn set_cell(
		&self,
		x: u32,
		y: u32,
		color: &Color,
	) -> Result<(), CanvasError> {
		let offset = self.shape
			.offset(x, y)
			.ok_or(CanvasError::OutOfBounds { x, y })?;

		self.store.write_range(offset, color.as_bytes()).await
	}

	pub async fn read(&self) -> Result<Bytes, CanvasError> {
		self.ensure_initialized().await?;
		self.store.read().await?.ok_or(CanvasError::Missing)
	}

	/// Rebuilds the whole canvas from logged placements.
	pub async fn restore(
		&self,
		placements: &[Placement],
	) -> Result<(), CanvasError> {
		let mut buffer = background_buffer(&self.shape, &self.background);

		for placement in placements {
			// rows from a differently sized canvas are skipped
			if let Some(offset) = self.shape.offset(placement.x, placement.y) {
				let bytes = placement.color.as_bytes();
				buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
			}
		}

		self.store.replace(buffer.freeze()).await?;

		info!("Restored canvas from {} logged placements", placements.len());

		Ok(())
	}
}
