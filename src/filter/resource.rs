use std::convert::Infallible;
use std::sync::Arc;

use warp::Filter;

use crate::board::{Board, ConnectionRegistry};
use crate::socket::SocketServer;

pub fn board(
	board: Arc<Board>,
) -> impl Filter<Extract = (Arc<Board>,), Error = Infallible> + Clone {
	warp::any().map(move || Arc::clone(&board))
}

pub fn sockets(
	sockets: Arc<SocketServer>,
) -> impl Filter<Extract = (Arc<SocketServer>,), Error = Infallible> + Clone {
	warp::any().map(move || Arc::clone(&sockets))
}

pub fn registry(
	registry: Arc<dyn ConnectionRegistry>,
) -> impl Filter<Extract = (Arc<dyn ConnectionRegistry>,), Error = Infallible> + Clone {
	warp::any().map(move || Arc::clone(&registry))
}
