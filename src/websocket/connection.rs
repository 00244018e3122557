//! WebSocket connection registry
//!
//! Tracks open connections per fid in a DashMap. A user may hold several
//! connections at once (e.g. two browser tabs). Nothing is persisted.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::messages::WsMessage;

/// Outbound channel of one connection
pub type WsSender = mpsc::UnboundedSender<WsMessage>;

/// Unique connection identifier
pub type ConnectionId = u64;

pub struct ConnectionManager {
    /// fid -> list of (connection_id, sender)
    connections: DashMap<u64, Vec<(ConnectionId, WsSender)>>,
    next_conn_id: AtomicU64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register a connection for `fid` and return its id.
    pub fn add_connection(&self, fid: u64, tx: WsSender) -> ConnectionId {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);

        let total = {
            let mut senders = self.connections.entry(fid).or_default();
            senders.push((conn_id, tx));
            senders.len()
        };

        tracing::info!(
            fid,
            conn_id,
            total_connections = total,
            "WebSocket connection added"
        );

        conn_id
    }

    /// Drop a closed connection; the fid entry goes away with its last connection.
    pub fn remove_connection(&self, fid: u64, conn_id: ConnectionId) {
        let remaining = match self.connections.get_mut(&fid) {
            Some(mut senders) => {
                senders.retain(|(id, _)| *id != conn_id);
                senders.len()
            }
            None => return,
        };

        if remaining == 0 {
            self.connections.remove_if(&fid, |_, senders| senders.is_empty());
            tracing::info!(fid, conn_id, "All WebSocket connections closed");
        } else {
            tracing::info!(
                fid,
                conn_id,
                remaining_connections = remaining,
                "WebSocket connection removed"
            );
        }
    }

    /// Send to every connection of `fid`. Returns how many accepted the message.
    pub fn send_to_user(&self, fid: u64, message: WsMessage) -> usize {
        let Some(senders) = self.connections.get(&fid) else {
            return 0;
        };
        let mut delivered = 0;
        for (conn_id, tx) in senders.iter() {
            if tx.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                // removal happens when the socket task exits
                tracing::warn!(fid, conn_id, "Failed to send - client disconnected");
            }
        }
        delivered
    }

    /// (number of users, total connections)
    pub fn stats(&self) -> (usize, usize) {
        let users = self.connections.len();
        let total_connections: usize = self
            .connections
            .iter()
            .map(|entry| entry.value().len())
            .sum();
        (users, total_connections)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let conn_id = manager.add_connection(3621, tx);
        assert_eq!(manager.stats(), (1, 1));

        manager.remove_connection(3621, conn_id);
        assert_eq!(manager.stats(), (0, 0));

        // unknown ids are ignored
        manager.remove_connection(3621, conn_id);
        assert_eq!(manager.stats(), (0, 0));
    }

    #[test]
    fn test_multiple_connections_per_user() {
        let manager = ConnectionManager::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let conn_id1 = manager.add_connection(7, tx1);
        let conn_id2 = manager.add_connection(7, tx2);
        assert_ne!(conn_id1, conn_id2);
        assert_eq!(manager.stats(), (1, 2));

        manager.remove_connection(7, conn_id1);
        assert_eq!(manager.stats(), (1, 1));

        manager.remove_connection(7, conn_id2);
        assert_eq!(manager.stats(), (0, 0));
    }

    #[test]
    fn test_send_to_user() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add_connection(7, tx);

        assert_eq!(manager.send_to_user(7, WsMessage::Ack { fid: 7 }), 1);
        assert_eq!(rx.try_recv().unwrap(), WsMessage::Ack { fid: 7 });

        assert_eq!(manager.send_to_user(8, WsMessage::Ack { fid: 8 }), 0);
    }

    #[test]
    fn test_send_to_closed_receiver() {
        let manager = ConnectionManager::new();
        let (tx, rx) = mpsc::unbounded_channel();
        manager.add_connection(7, tx);
        drop(rx);

        assert_eq!(manager.send_to_user(7, WsMessage::Ack { fid: 7 }), 0);
        assert_eq!(manager.stats(), (1, 1));
    }
}
