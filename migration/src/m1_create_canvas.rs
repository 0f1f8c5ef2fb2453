use sea_orm_migration::prelude::*;

use super::{col, key};

#[derive(Iden)]
enum Canvas {
	Table,
	Name,
	Data,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let create_canvas = Table::create()
			.table(Canvas::Table)
			.if_not_exists()
			.col(key!(Canvas::Name).text())
			.col(col!(Canvas::Data).binary())
			.to_owned();

		manager.create_table(create_canvas).await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let drop_canvas = Table::drop()
			.table(Canvas::Table)
			.to_owned();

		manager.drop_table(drop_canvas).await?;

		Ok(())
	}
}
