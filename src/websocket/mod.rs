//! WebSocket channel for signed-in clients
//!
//! The upgrade handshake is gated by the same session token as the HTTP
//! routes. Once connected a client can ping and is acknowledged with its fid.

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::ConnectionManager;
pub use handler::ws_handler;
pub use messages::{ClientMessage, WsMessage};
