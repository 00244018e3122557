use serde::{Deserialize, Serialize};

/// Server to client messages, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Sent once after the handshake succeeds
    Connected { fid: u64 },
    /// Reply to a client ping
    Ack { fid: u64 },
    Error { message: String },
}

/// Client to server messages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}
