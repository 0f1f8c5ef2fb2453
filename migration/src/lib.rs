pub use sea_orm_migration::prelude::*;

mod m0_create_placement;
mod m1_create_canvas;
mod m2_create_connection;
mod m3_placement_indices;

pub struct Migrator;

macro_rules! col {
	($name:expr) => {
		sea_orm_migration::prelude::ColumnDef::new($name).not_null()
	}
}

macro_rules! key {
	($name:expr) => {
		sea_orm_migration::prelude::ColumnDef::new($name).not_null().primary_key()
	}
}

use {col, key};

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m0_create_placement::Migration),
			Box::new(m1_create_canvas::Migration),
			Box::new(m2_create_connection::Migration),
			Box::new(m3_placement_indices::Migration),
		]
	}
}
