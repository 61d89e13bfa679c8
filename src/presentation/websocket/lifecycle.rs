//! Connection Lifecycle
//!
//! Per-connection state machine: `Unbound -> Bound -> Closed`.
//!
//! A connection starts unbound when the socket is upgraded. `hello` binds it
//! to a user, registers it and broadcasts presence. Disconnect unregisters it
//! (a no-op if it was never bound) and always broadcasts presence.
//! `Closed` is terminal.

use std::sync::Arc;

use super::gateway::Gateway;
use super::registry::{ConnectionHandle, ConnectionId};
use crate::domain::UserId;

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unbound,
    Bound(UserId),
    Closed,
}

/// What a `hello` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelloOutcome {
    /// First hello on this connection
    Bound,
    /// Repeated hello with the same identity
    Rebound,
    /// Hello for a different user on an already bound connection
    IdentityMismatch { bound_to: UserId },
    /// The connection is already closed
    Closed,
}

pub struct ConnectionLifecycle {
    handle: ConnectionHandle,
    state: ConnectionState,
    gateway: Arc<Gateway>,
}

impl ConnectionLifecycle {
    /// Start tracking `handle` as an open, unbound connection.
    pub fn open(gateway: Arc<Gateway>, handle: ConnectionHandle) -> Self {
        gateway.open_connection(handle.clone());
        Self {
            handle,
            state: ConnectionState::Unbound,
            gateway,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id()
    }

    /// The bound user, if any. `None` once closed.
    pub fn user_id(&self) -> Option<UserId> {
        match self.state {
            ConnectionState::Bound(user_id) => Some(user_id),
            _ => None,
        }
    }

    /// Bind this connection to `user_id` and broadcast presence.
    pub fn hello(&mut self, user_id: UserId) -> HelloOutcome {
        let outcome = match self.state {
            ConnectionState::Closed => return HelloOutcome::Closed,
            ConnectionState::Bound(bound_to) if bound_to != user_id => {
                tracing::warn!(
                    connection_id = %self.handle.id(),
                    bound_to,
                    requested = user_id,
                    "Ignoring hello for a different user"
                );
                return HelloOutcome::IdentityMismatch { bound_to };
            }
            ConnectionState::Bound(_) => HelloOutcome::Rebound,
            ConnectionState::Unbound => HelloOutcome::Bound,
        };

        self.state = ConnectionState::Bound(user_id);
        self.gateway.registry().register(user_id, self.handle.clone());

        tracing::info!(
            user_id,
            connection_id = %self.handle.id(),
            user_connections = self.gateway.registry().connections_for(user_id).len(),
            online_users = self.gateway.registry().online_users().len(),
            "User connected"
        );

        self.gateway.broadcast_online_users();
        outcome
    }

    /// Tear down this connection and broadcast presence.
    ///
    /// Calling it again after the first time does nothing.
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }

        let user_id = self.gateway.registry().unregister(&self.handle);
        self.gateway.close_connection(self.handle.id());
        self.state = ConnectionState::Closed;

        tracing::info!(
            user_id = ?user_id,
            connection_id = %self.handle.id(),
            "Connection disconnected"
        );

        self.gateway.broadcast_online_users();
    }
}

impl Drop for ConnectionLifecycle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::websocket::messages::ServerEvent;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn connect(gateway: &Arc<Gateway>) -> (ConnectionLifecycle, UnboundedReceiver<ServerEvent>) {
        let (handle, rx) = ConnectionHandle::channel();
        (ConnectionLifecycle::open(gateway.clone(), handle), rx)
    }

    fn presence(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<Vec<UserId>> {
        let mut snapshots = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ServerEvent::OnlineUsersUpdated(users) = event {
                snapshots.push(users);
            }
        }
        snapshots
    }

    #[test]
    fn test_starts_unbound() {
        let gateway = Arc::new(Gateway::new());
        let (conn, _rx) = connect(&gateway);

        assert_eq!(conn.state(), ConnectionState::Unbound);
        assert_eq!(conn.user_id(), None);
        assert_eq!(gateway.connection_count(), 1);
        assert!(gateway.registry().online_users().is_empty());
    }

    #[test]
    fn test_hello_binds_and_broadcasts() {
        let gateway = Arc::new(Gateway::new());
        let (mut conn, mut rx) = connect(&gateway);

        assert_eq!(conn.hello(1), HelloOutcome::Bound);
        assert_eq!(conn.state(), ConnectionState::Bound(1));
        assert_eq!(conn.user_id(), Some(1));
        assert_eq!(presence(&mut rx), vec![vec![1]]);
    }

    #[test]
    fn test_repeated_hello_is_idempotent() {
        let gateway = Arc::new(Gateway::new());
        let (mut conn, mut rx) = connect(&gateway);

        conn.hello(1);
        assert_eq!(conn.hello(1), HelloOutcome::Rebound);

        assert_eq!(gateway.registry().connections_for(1).len(), 1);
        assert_eq!(presence(&mut rx), vec![vec![1], vec![1]]);
    }

    #[test]
    fn test_hello_for_other_user_ignored() {
        let gateway = Arc::new(Gateway::new());
        let (mut conn, mut rx) = connect(&gateway);

        conn.hello(1);
        assert_eq!(conn.hello(2), HelloOutcome::IdentityMismatch { bound_to: 1 });

        assert_eq!(conn.user_id(), Some(1));
        assert_eq!(gateway.registry().online_users(), vec![1]);
        // No second broadcast
        assert_eq!(presence(&mut rx), vec![vec![1]]);
    }

    #[test]
    fn test_presence_scenario() {
        let gateway = Arc::new(Gateway::new());
        let (mut a, mut a_rx) = connect(&gateway);
        let (mut b, mut b_rx) = connect(&gateway);

        a.hello(1);
        assert_eq!(presence(&mut a_rx), vec![vec![1]]);
        assert_eq!(presence(&mut b_rx), vec![vec![1]]);

        b.hello(2);
        assert_eq!(presence(&mut a_rx), vec![vec![1, 2]]);
        assert_eq!(presence(&mut b_rx), vec![vec![1, 2]]);

        a.disconnect();
        assert_eq!(a.state(), ConnectionState::Closed);
        assert!(presence(&mut a_rx).is_empty());
        assert_eq!(presence(&mut b_rx), vec![vec![2]]);
    }

    #[test]
    fn test_unbound_disconnect_still_broadcasts() {
        let gateway = Arc::new(Gateway::new());
        let (mut watcher, mut watcher_rx) = connect(&gateway);
        watcher.hello(3);
        presence(&mut watcher_rx);

        let (mut lurker, _lurker_rx) = connect(&gateway);
        lurker.disconnect();

        assert_eq!(presence(&mut watcher_rx), vec![vec![3]]);
        assert_eq!(gateway.connection_count(), 1);
    }

    #[test]
    fn test_one_tab_closing_keeps_user_online() {
        let gateway = Arc::new(Gateway::new());
        let (mut tab1, _rx1) = connect(&gateway);
        let (mut tab2, mut rx2) = connect(&gateway);
        tab1.hello(1);
        tab2.hello(1);
        presence(&mut rx2);

        tab1.disconnect();

        assert_eq!(gateway.registry().online_users(), vec![1]);
        assert_eq!(presence(&mut rx2), vec![vec![1]]);
    }

    #[test]
    fn test_closed_is_terminal() {
        let gateway = Arc::new(Gateway::new());
        let (mut conn, mut rx) = connect(&gateway);
        conn.hello(1);
        conn.disconnect();
        presence(&mut rx);

        assert_eq!(conn.hello(1), HelloOutcome::Closed);
        assert_eq!(conn.user_id(), None);
        assert!(gateway.registry().online_users().is_empty());

        let (_other, mut other_rx) = connect(&gateway);
        conn.disconnect();
        assert!(presence(&mut other_rx).is_empty());
    }

    #[test]
    fn test_drop_cleans_up() {
        let gateway = Arc::new(Gateway::new());
        let (mut watcher, mut watcher_rx) = connect(&gateway);
        watcher.hello(1);

        {
            let (mut conn, _rx) = connect(&gateway);
            conn.hello(2);
        }

        assert_eq!(gateway.registry().online_users(), vec![1]);
        assert_eq!(gateway.connection_count(), 1);
        assert_eq!(presence(&mut watcher_rx).last(), Some(&vec![1]));
    }
}
