use serde::Serialize;

use super::color::HEX_DIGITS;

/// One hex digit per byte, no packing.
pub const BYTES_PER_PIXEL: usize = HEX_DIGITS;

/// Largest buffer a single postgres `bytea` value can hold.
pub const MAX_LEN: usize = (1 << 30) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasShape {
	pub width: u32,
	pub height: u32,
}

impl Default for CanvasShape {
	fn default() -> Self {
		Self { width: 1000, height: 1000 }
	}
}

impl CanvasShape {
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	pub fn pixels(&self) -> usize {
		self.width as usize * self.height as usize
	}

	/// Length in bytes of the whole canvas buffer.
	pub fn len(&self) -> usize {
		self.pixels() * BYTES_PER_PIXEL
	}

	/// Like [`CanvasShape::len`] but `None` past [`MAX_LEN`].
	pub fn checked_len(&self) -> Option<usize> {
		(self.width as usize)
			.checked_mul(self.height as usize)
			.and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
			.filter(|len| *len <= MAX_LEN)
	}

	pub fn is_empty(&self) -> bool {
		self.pixels() == 0
	}

	pub fn contains(&self, x: u32, y: u32) -> bool {
		x < self.width && y < self.height
	}

	/// Start of the byte range owned by `(x, y)`.
	pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
		self.contains(x, y).then(|| {
			(x as usize + y as usize * self.width as usize) * BYTES_PER_PIXEL
		})
	}
}
