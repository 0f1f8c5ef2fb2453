use sea_orm_migration::prelude::*;

use super::{col, key};

#[derive(Iden)]
enum Connection {
	Table,
	Id,
	#[iden = "connected_at"]
	ConnectedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let create_connection = Table::create()
			.table(Connection::Table)
			.if_not_exists()
			.col(key!(Connection::Id).text())
			.col(col!(Connection::ConnectedAt).big_integer())
			.to_owned();

		manager.create_table(create_connection).await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let drop_connection = Table::drop()
			.table(Connection::Table)
			.to_owned();

		manager.drop_table(drop_connection).await?;

		Ok(())
	}
}
