use sea_orm_migration::prelude::*;

use super::{col, key};

#[derive(Iden)]
enum Placement {
	Table,
	Coordinate,
	X,
	Y,
	Color,
	#[iden = "user_id"]
	UserId,
	Time,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// one row per coordinate: this is the current state, not a history
		let create_placement = Table::create()
			.table(Placement::Table)
			.if_not_exists()
			.col(key!(Placement::Coordinate).text())
			.col(col!(Placement::X).integer())
			.col(col!(Placement::Y).integer())
			.col(col!(Placement::Color).text())
			.col(col!(Placement::UserId).text())
			.col(col!(Placement::Time).big_integer())
			.to_owned();

		manager.create_table(create_placement).await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let drop_placement = Table::drop()
			.table(Placement::Table)
			.to_owned();

		manager.drop_table(drop_placement).await?;

		Ok(())
	}
}
