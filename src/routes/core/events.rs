use std::sync::Arc;

use log::{error, info, warn};
use warp::ws::Ws;
use warp::{Filter, Rejection, Reply};

use crate::board::{Board, ConnectionRegistry};
use crate::filter::resource;
use crate::socket::{CloseReason, Socket, SocketServer};

/// Viewer connections. Each socket is pushed every accepted placement and
/// may submit placements of its own.
pub fn events(
	board: Arc<Board>,
	sockets: Arc<SocketServer>,
	registry: Arc<dyn ConnectionRegistry>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
	warp::path("events")
		.and(warp::path::end())
		.and(warp::ws())
		.and(resource::board(board))
		.and(resource::sockets(sockets))
		.and(resource::registry(registry))
		.map(|ws: Ws, board: Arc<Board>, sockets: Arc<SocketServer>, registry: Arc<dyn ConnectionRegistry>| {
			ws.on_upgrade(move |websocket| async move {
				let (socket, receiver) = Socket::connect(websocket);
				let id = socket.id();

				sockets.insert(Arc::clone(&socket)).await;

				if let Err(err) = registry.register(&id).await {
					error!("Could not register socket {}: {}", id, err);
					socket.close(Some(CloseReason::ServerError));
					sockets.remove(&socket).await;
					return;
				}

				info!("Socket {} connected", id);

				socket.run(receiver, &board).await;

				sockets.remove(&socket).await;
				if let Err(err) = registry.unregister(&id).await {
					warn!("Could not unregister socket {}: {}", id, err);
				}

				info!("Socket {} disconnected", id);
			})
		})
}
