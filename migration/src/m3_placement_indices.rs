use sea_orm_migration::prelude::*;

#[derive(Iden)]
enum Placement {
	Table,
	Time,
}

const PLACEMENT_BY_TIME: &str = "placement_by_time";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let create_placement_by_time = Index::create()
			.name(PLACEMENT_BY_TIME)
			.table(Placement::Table)
			.col(Placement::Time)
			.if_not_exists()
			.to_owned();

		manager.create_index(create_placement_by_time).await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let drop_placement_by_time = Index::drop()
			.name(PLACEMENT_BY_TIME)
			.to_owned();

		manager.drop_index(drop_placement_by_time).await?;

		Ok(())
	}
}
