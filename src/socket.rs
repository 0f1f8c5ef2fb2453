mod packet;
mod server;

use std::sync::Arc;

use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use log::debug;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::ws;

use crate::board::{Board, DeliveryError, PlacementRequest, PlacementResponse};

use packet::ClientPacket;
pub use server::SocketServer;

pub enum CloseReason {
	ServerError,
	InvalidPacket,
}

impl From<CloseReason> for u16 {
	fn from(reason: CloseReason) -> Self {
		match reason {
			CloseReason::ServerError => 1011,
			CloseReason::InvalidPacket => 1008,
		}
	}
}

enum Message {
	Close,
	Ping,
	Pong,
	Packet(ClientPacket),
	Invalid,
}

impl From<ws::Message> for Message {
	fn from(message: ws::Message) -> Message {
		if let Ok(text) = message.to_str() {
			match serde_json::from_str::<ClientPacket>(text) {
				Ok(packet) => Self::Packet(packet),
				Err(_) => Self::Invalid,
			}
		} else if message.is_ping() {
			Self::Ping
		} else if message.is_pong() {
			Self::Pong
		} else if message.is_close() {
			Self::Close
		} else {
			Self::Invalid
		}
	}
}

type Sender = mpsc::UnboundedSender<Result<ws::Message, warp::Error>>;

pub struct Socket {
	uuid: Uuid,
	sender: Sender,
}

impl Socket {
	/// Starts forwarding outgoing frames and hands back the incoming half.
	pub fn connect(
		websocket: ws::WebSocket,
	) -> (Arc<Self>, SplitStream<ws::WebSocket>) {
		let (ws_sender, ws_receiver) = websocket.split();
		let (sender, sender_receiver) = mpsc::unbounded_channel();

		let sender_receiver = UnboundedReceiverStream::new(sender_receiver);

		tokio::task::spawn(sender_receiver.forward(ws_sender));

		let socket = Socket {
			uuid: Uuid::new_v4(),
			sender,
		};

		(Arc::new(socket), ws_receiver)
	}

	pub fn id(&self) -> String {
		self.uuid.to_string()
	}

	pub fn send(&self, text: &str) -> Result<(), DeliveryError> {
		self.sender.send(Ok(ws::Message::text(text)))
			.map_err(|_| DeliveryError::Gone)
	}

	pub fn close(&self, reason: Option<CloseReason>) {
		let close = if let Some(reason) = reason {
			ws::Message::close_with(reason, "")
		} else {
			ws::Message::close()
		};

		let _ = self.sender.send(Ok(close));
	}

	/// Handles incoming frames until the client goes away or misbehaves.
	pub async fn run(
		&self,
		mut receiver: SplitStream<ws::WebSocket>,
		board: &Board,
	) {
		while let Some(Ok(message)) = receiver.next().await {
			match Message::from(message) {
				Message::Packet(ClientPacket::SendMessage { message }) => {
					let response = match PlacementRequest::from_value(message) {
						Ok(request) => board.submit(request).await,
						Err(err) => {
							PlacementResponse::failure(StatusCode::BAD_REQUEST, &err)
						},
					};

					let sent = serde_json::to_string(&response)
						.map_err(|err| DeliveryError::Transport(err.to_string()))
						.and_then(|response| self.send(&response));

					if let Err(err) = sent {
						debug!("Dropping response for socket {}: {}", self.uuid, err);
						return;
					}
				},
				Message::Packet(ClientPacket::Ping) => {
					if self.sender.send(Ok(ws::Message::ping([]))).is_err() {
						self.close(None);
					}
				},
				Message::Invalid => {
					self.close(Some(CloseReason::InvalidPacket));
					return;
				},
				Message::Close => (),
				Message::Pong => (),
				Message::Ping => (),
			}
		}
	}
}
