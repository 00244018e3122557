//! WebSocket upgrade and connection lifecycle.

use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::connection::ConnectionManager;
use super::messages::{ClientMessage, WsMessage};
use crate::auth::{AuthError, AuthErrorCode, Principal, authenticate};
use crate::gateway::state::AppState;

/// Handshake parameters
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Endpoint: GET /ws?token=<session token>
///
/// The token is verified before the upgrade; a rejected handshake gets the
/// same error response an HTTP request would.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AuthError> {
    let principal = params
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::MissingToken))
        .and_then(|token| authenticate(&state.tokens, token))
        .map_err(|e| {
            tracing::debug!(code = e.code.name(), "WebSocket handshake rejected");
            state.auth_rejection(e)
        })?;

    let manager = state.ws_manager.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, principal, manager)))
}

/// Reply to a single client text frame.
fn reply_to(text: &str, fid: u64) -> WsMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Ping) => WsMessage::Ack { fid },
        Err(_) => WsMessage::Error {
            message: "unsupported message".to_string(),
        },
    }
}

async fn handle_socket(socket: WebSocket, principal: Principal, manager: Arc<ConnectionManager>) {
    let fid = principal.fid();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let conn_id = manager.add_connection(fid, tx.clone());

    let welcome = WsMessage::Connected { fid };
    if let Ok(json) = serde_json::to_string(&welcome) {
        let _ = sender.send(Message::Text(json.into())).await;
    }

    // channel -> socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // socket -> replies
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if tx.send(reply_to(text.as_str(), fid)).is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    manager.remove_connection(fid, conn_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_is_acknowledged_with_fid() {
        assert_eq!(reply_to(r#"{"type":"ping"}"#, 42), WsMessage::Ack { fid: 42 });
    }

    #[test]
    fn test_unknown_message_gets_error() {
        for text in [r#"{"type":"subscribe"}"#, "ping", ""] {
            assert!(matches!(reply_to(text, 42), WsMessage::Error { .. }));
        }
    }
}
