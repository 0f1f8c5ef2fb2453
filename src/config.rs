use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::board::{CanvasShape, Color};

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
	#[error("{0}")]
	Env(String),
	#[error("BACKGROUND_COLOR must be six hex digits without '#': {0}")]
	Background(String),
	#[error("CANVAS_WIDTH and CANVAS_HEIGHT must be non-zero")]
	EmptyCanvas,
	#[error("a {0}x{1} canvas does not fit in one database value")]
	OversizedCanvas(u32, u32),
	#[error("STAGE_TIMEOUT_MS must be non-zero")]
	NoTimeout,
	#[error("cannot bind to {0}")]
	Address(String),
}

impl From<envy::Error> for ConfigError {
	fn from(value: envy::Error) -> Self {
		Self::Env(value.to_string())
	}
}

fn default_host() -> String { String::from("127.0.0.1") }
fn default_port() -> u16 { 8000 }
fn default_canvas_name() -> String { String::from("board") }
fn default_dimension() -> u32 { 1000 }
fn default_background() -> String { String::from("FFFFFF") }
fn default_stage_timeout() -> u64 { 3000 }

#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	pub database_url: Url,
	pub canvas_database_url: Option<Url>,
	pub connections_database_url: Option<Url>,
	#[serde(default = "default_canvas_name")]
	pub canvas_name: String,
	#[serde(default = "default_dimension")]
	pub canvas_width: u32,
	#[serde(default = "default_dimension")]
	pub canvas_height: u32,
	#[serde(default = "default_background")]
	pub background_color: String,
	#[serde(default = "default_stage_timeout")]
	pub stage_timeout_ms: u64,
	#[serde(default)]
	pub restore_canvas: bool,
}

impl Config {
	pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
	where I: IntoIterator<Item = (String, String)> {
		let config = envy::from_iter::<_, Self>(vars)?;
		config.check()?;
		Ok(config)
	}

	fn check(&self) -> Result<(), ConfigError> {
		self.shape()?;
		self.background()?;

		if self.stage_timeout_ms == 0 {
			return Err(ConfigError::NoTimeout);
		}

		Ok(())
	}

	pub fn shape(&self) -> Result<CanvasShape, ConfigError> {
		let shape = CanvasShape::new(self.canvas_width, self.canvas_height);
		if shape.is_empty() {
			Err(ConfigError::EmptyCanvas)
		} else if shape.checked_len().is_none() {
			Err(ConfigError::OversizedCanvas(shape.width, shape.height))
		} else {
			Ok(shape)
		}
	}

	pub fn background(&self) -> Result<Color, ConfigError> {
		Color::from_hex(&self.background_color)
			.map_err(|err| ConfigError::Background(err.to_string()))
	}

	pub fn stage_timeout(&self) -> Duration {
		Duration::from_millis(self.stage_timeout_ms)
	}

	pub fn address(&self) -> Result<SocketAddr, ConfigError> {
		let address = format!("{}:{}", self.host, self.port);
		address.to_socket_addrs()
			.ok()
			.and_then(|mut addresses| addresses.next())
			.ok_or(ConfigError::Address(address))
	}

	pub fn canvas_url(&self) -> &Url {
		self.canvas_database_url.as_ref().unwrap_or(&self.database_url)
	}

	pub fn connections_url(&self) -> &Url {
		self.connections_database_url.as_ref().unwrap_or(&self.database_url)
	}
}

lazy_static! {
	pub static ref CONFIG: Result<Config, ConfigError> = Config::from_vars(std::env::vars());
}
