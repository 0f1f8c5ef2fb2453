use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::board::{DeliveryError, PushChannel};

use super::Socket;

/// The sockets connected to this instance, by id.
#[derive(Default)]
pub struct SocketServer {
	sockets: RwLock<HashMap<String, Arc<Socket>>>,
}

impl SocketServer {
	pub async fn insert(&self, socket: Arc<Socket>) {
		self.sockets.write().await.insert(socket.id(), socket);
	}

	pub async fn remove(&self, socket: &Socket) {
		self.sockets.write().await.remove(&socket.id());
	}

	pub async fn connected(&self) -> usize {
		self.sockets.read().await.len()
	}
}

#[async_trait]
impl PushChannel for SocketServer {
	async fn post(
		&self,
		recipient: &str,
		payload: &str,
	) -> Result<(), DeliveryError> {
		let socket = self.sockets.read().await
			.get(recipient)
			.cloned()
			.ok_or(DeliveryError::Gone)?;

		socket.send(payload)
	}
}
