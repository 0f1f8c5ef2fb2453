use async_trait::async_trait;
use thiserror::Error;
use tokio::time::error::Elapsed;

#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("{0}")]
	Unavailable(String),
	#[error("could not start broadcast: {0}")]
	Fanout(String),
}

impl From<sea_orm::DbErr> for RegistryError {
	fn from(value: sea_orm::DbErr) -> Self {
		Self::Unavailable(value.to_string())
	}
}

impl From<Elapsed> for RegistryError {
	fn from(_: Elapsed) -> Self {
		Self::Unavailable(String::from("timed out"))
	}
}

/// The set of viewer connections, shared by every server instance.
///
/// Placements only ever read it. Entries may be stale; pruning them is up to
/// whoever manages connections.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
	async fn list_active(&self) -> Result<Vec<String>, RegistryError>;

	async fn register(&self, id: &str) -> Result<(), RegistryError>;

	async fn unregister(&self, id: &str) -> Result<(), RegistryError>;
}
