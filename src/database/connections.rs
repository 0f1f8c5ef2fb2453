use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QuerySelect, Set};

use crate::board::{ConnectionRegistry, RegistryError};

use super::entities::*;

/// The shared record of which viewers are connected, across every instance.
pub struct ConnectionTable {
	connection: DatabaseConnection,
}

impl ConnectionTable {
	pub fn new(connection: DatabaseConnection) -> Self {
		Self { connection }
	}
}

#[async_trait]
impl ConnectionRegistry for ConnectionTable {
	async fn list_active(&self) -> Result<Vec<String>, RegistryError> {
		let ids = connection::Entity::find()
			.select_only()
			.column(connection::Column::Id)
			.into_tuple::<String>()
			.all(&self.connection).await?;

		Ok(ids)
	}

	async fn register(&self, id: &str) -> Result<(), RegistryError> {
		let connected_at = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|duration| duration.as_millis() as i64)
			.unwrap_or(0);

		let model = connection::ActiveModel {
			id: Set(id.to_owned()),
			connected_at: Set(connected_at),
		};

		connection::Entity::insert(model)
			.on_conflict_do_nothing()
			.exec(&self.connection).await?;

		Ok(())
	}

	async fn unregister(&self, id: &str) -> Result<(), RegistryError> {
		connection::Entity::delete_by_id(id.to_owned())
			.exec(&self.connection).await?;

		Ok(())
	}
}
