use async_trait::async_trait;
use thiserror::Error;
use tokio::time::error::Elapsed;

use super::placement::Placement;

#[derive(Debug, Error)]
pub enum LogError {
	#[error("{0}")]
	Unavailable(String),
	#[error("record at {coordinate} is unreadable: {reason}")]
	Corrupt { coordinate: String, reason: String },
}

impl From<sea_orm::DbErr> for LogError {
	fn from(value: sea_orm::DbErr) -> Self {
		Self::Unavailable(value.to_string())
	}
}

impl From<Elapsed> for LogError {
	fn from(_: Elapsed) -> Self {
		Self::Unavailable(String::from("timed out"))
	}
}

/// The system of record for canvas content.
///
/// Holds one record per coordinate; recording a placement replaces whatever
/// was last recorded there.
#[async_trait]
pub trait PlacementLog: Send + Sync {
	async fn record(&self, placement: &Placement) -> Result<(), LogError>;

	async fn get(
		&self,
		x: u32,
		y: u32,
	) -> Result<Option<Placement>, LogError>;

	async fn list(&self) -> Result<Vec<Placement>, LogError>;
}
