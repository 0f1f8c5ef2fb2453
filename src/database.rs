use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use url::Url;

mod entities;
mod canvas;
mod connections;
mod placements;

pub use canvas::CanvasTable;
pub use connections::ConnectionTable;
pub use placements::PlacementTable;

use migration::Migrator;

/// Opens a pool to `url` and brings its schema up to date.
pub async fn connect(url: &Url) -> Result<DatabaseConnection, DbErr> {
	let mut connect_options = ConnectOptions::new(url.to_string());
	connect_options
		.connect_timeout(Duration::from_secs(2))
		.acquire_timeout(Duration::from_secs(2))
		.sqlx_logging(false);

	let pool = Database::connect(connect_options).await?;
	Migrator::up(&pool, None).await?;
	Ok(pool)
}
