use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "action")]
#[serde(rename_all = "lowercase")]
pub enum ClientPacket {
	/// A placement, in the same shape `POST /pixels` accepts.
	SendMessage { message: serde_json::Value },
	Ping,
}
