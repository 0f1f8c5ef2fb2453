#[macro_use]
extern crate lazy_static;

mod board;
mod config;
mod database;
mod filter;
mod routes;
mod socket;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use log::{error, info};
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use url::Url;
use warp::http::Method;
use warp::Filter;

use crate::board::{Board, Canvas, ConnectionRegistry, Fanout, RestoreError};
use crate::config::{ConfigError, CONFIG};
use crate::database::{CanvasTable, ConnectionTable, PlacementTable};
use crate::socket::SocketServer;

#[derive(Debug, Error)]
enum StartupError {
	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),
	#[error("database unavailable: {0}")]
	Database(#[from] DbErr),
	#[error("canvas restore failed: {0}")]
	Restore(#[from] RestoreError),
}

/// Reuses `shared` when `url` points at the same database.
async fn connect_or_share(
	url: &Url,
	shared_url: &Url,
	shared: &DatabaseConnection,
) -> Result<DatabaseConnection, DbErr> {
	if url == shared_url {
		Ok(shared.clone())
	} else {
		database::connect(url).await
	}
}

async fn run() -> Result<(), StartupError> {
	let config = CONFIG.as_ref().map_err(Clone::clone)?;

	let shape = config.shape()?;
	let background = config.background()?;
	let address = config.address()?;
	let deadline = config.stage_timeout();

	let log_db = database::connect(&config.database_url).await?;
	let canvas_db = connect_or_share(
		config.canvas_url(),
		&config.database_url,
		&log_db,
	).await?;
	let connections_db = connect_or_share(
		config.connections_url(),
		&config.database_url,
		&log_db,
	).await?;

	let registry: Arc<dyn ConnectionRegistry> = Arc::new(ConnectionTable::new(connections_db));
	let sockets = Arc::new(SocketServer::default());

	let canvas = Canvas::new(
		Arc::new(CanvasTable::new(canvas_db, config.canvas_name.clone())),
		shape,
		background,
	);

	let board = Arc::new(Board::new(
		Arc::new(PlacementTable::new(log_db)),
		canvas,
		Arc::clone(&registry),
		Fanout::new(Arc::clone(&sockets) as _),
		deadline,
	));

	if config.restore_canvas {
		board.restore_canvas().await?;
	}

	let routes = routes::core::pixels::post(Arc::clone(&board))
		.or(routes::core::pixels::get(Arc::clone(&board)))
		.or(routes::core::canvas::info(Arc::clone(&board)))
		.or(routes::core::canvas::get(Arc::clone(&board)))
		.or(routes::core::events::events(
			Arc::clone(&board),
			Arc::clone(&sockets),
			Arc::clone(&registry),
		))
		.with(
			warp::cors()
				.allow_any_origin()
				.allow_header("content-type")
				.allow_methods([Method::GET, Method::POST]),
		);

	info!(
		"Serving {}x{} canvas \"{}\" on {}",
		shape.width,
		shape.height,
		config.canvas_name,
		address,
	);

	warp::serve(routes).run(address).await;

	Ok(())
}

#[tokio::main]
async fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.init();

	if let Err(err) = run().await {
		error!("{}", err);
		std::process::exit(1);
	}
}
