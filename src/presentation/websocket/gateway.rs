//! WebSocket Gateway
//!
//! Owns the set of open connections and the connection registry, and
//! broadcasts presence snapshots.

use dashmap::DashMap;
use parking_lot::Mutex;

use super::messages::ServerEvent;
use super::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::domain::UserId;
use crate::infrastructure::metrics;

/// Every open connection plus the user-to-connections registry.
///
/// A connection is "open" from socket upgrade until disconnect, whether or
/// not it has been bound to a user. Presence broadcasts reach every open
/// connection; message fan-out only reaches bound ones.
pub struct Gateway {
    /// All open connections by id
    connections: DashMap<ConnectionId, ConnectionHandle>,
    registry: ConnectionRegistry,
    /// Serializes presence broadcasts so snapshots reach each outbox in
    /// registry order
    broadcast_lock: Mutex<()>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            registry: ConnectionRegistry::new(),
            broadcast_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Track a newly opened connection.
    pub fn open_connection(&self, handle: ConnectionHandle) {
        let connection_id = handle.id();
        self.connections.insert(connection_id, handle);
        self.update_metrics();

        tracing::debug!(connection_id = %connection_id, "Connection opened");
    }

    /// Stop tracking a connection. Does not touch the registry.
    pub fn close_connection(&self, connection_id: ConnectionId) {
        if self.connections.remove(&connection_id).is_some() {
            self.update_metrics();
            tracing::debug!(connection_id = %connection_id, "Connection closed");
        }
    }

    /// Number of open connections, bound or not.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Push the current online-user snapshot to every open connection.
    ///
    /// Returns the number of connections the event was queued for.
    pub fn broadcast_online_users(&self) -> usize {
        let _guard = self.broadcast_lock.lock();

        let online = self.registry.online_users();
        let targets: Vec<ConnectionHandle> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let delivered = targets
            .iter()
            .filter(|handle| handle.send(ServerEvent::OnlineUsersUpdated(online.clone())))
            .count();

        tracing::debug!(
            online_users = online.len(),
            connections = targets.len(),
            delivered,
            "Broadcast online users"
        );
        self.update_metrics();

        delivered
    }

    /// Queue `event` for every live connection of `user_id`.
    ///
    /// Returns the number of connections the event was queued for.
    pub fn send_to_user(&self, user_id: UserId, event: &ServerEvent) -> usize {
        self.registry
            .connections_for(user_id)
            .iter()
            .filter(|handle| handle.send(event.clone()))
            .count()
    }

    fn update_metrics(&self) {
        metrics::set_presence(
            self.connections.len(),
            self.registry.connection_count(),
            self.registry.online_users().len(),
        );
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
