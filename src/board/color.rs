use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize, Serializer};
use serde::de::{self, Deserializer, Visitor};
use thiserror::Error;

pub const HEX_DIGITS: usize = 6;
const MARKER: char = '#';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
	#[error("color must start with '#'")]
	MissingMarker,
	#[error("color must be exactly six hex digits")]
	InvalidLength,
	#[error("color contains a non-hex digit")]
	InvalidDigit,
}

/// An RGB color as the six ASCII hex digits it is stored as on the canvas.
///
/// Digit case is preserved as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color([u8; HEX_DIGITS]);

impl Color {
	pub const WHITE: Color = Color(*b"FFFFFF");

	/// Parses the bare canvas form, `RRGGBB`.
	pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
		let digits: [u8; HEX_DIGITS] = hex.as_bytes()
			.try_into()
			.map_err(|_| ColorParseError::InvalidLength)?;

		if digits.iter().all(u8::is_ascii_hexdigit) {
			Ok(Self(digits))
		} else {
			Err(ColorParseError::InvalidDigit)
		}
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn hex(&self) -> &str {
		// only ever constructed from ascii hex digits
		std::str::from_utf8(&self.0).unwrap_or_default()
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::WHITE
	}
}

/// Parses the marked wire form, `#RRGGBB`.
impl FromStr for Color {
	type Err = ColorParseError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		value.strip_prefix(MARKER)
			.ok_or(ColorParseError::MissingMarker)
			.and_then(Self::from_hex)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", MARKER, self.hex())
	}
}

impl Serialize for Color {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where S: Serializer {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Color {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct ColorVisitor;

		impl<'de> Visitor<'de> for ColorVisitor {
			type Value = Color;

			fn expecting(
				&self,
				formatter: &mut fmt::Formatter,
			) -> fmt::Result {
				formatter.write_str("a '#' followed by six hex digits")
			}

			fn visit_str<E>(
				self,
				value: &str,
			) -> Result<Self::Value, E>
			where
				E: de::Error,
			{
				value.parse().map_err(E::custom)
			}
		}

		deserializer.deserialize_str(ColorVisitor)
	}
}
