//! Connection Registry
//!
//! In-memory map from user id to the set of live connections bound to that
//! user. Nothing here is persisted: after a restart every user is offline
//! until their clients say hello again.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerEvent;
use crate::domain::UserId;

/// Unique id of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque reference to one live connection.
///
/// Equality and hashing use the connection id only. Sending is best effort:
/// once the connection's writer has gone away, [`ConnectionHandle::send`]
/// returns `false` and the event is dropped.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbox: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(outbox: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            outbox,
        }
    }

    /// Create a handle together with the receiving end of its outbox.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event for this connection.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.outbox.send(event).is_ok()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl Hash for ConnectionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle").field("id", &self.id).finish()
    }
}

#[derive(Default)]
struct RegistryInner {
    /// Never holds an empty set
    users: BTreeMap<UserId, HashSet<ConnectionHandle>>,
    owners: HashMap<ConnectionId, UserId>,
}

impl RegistryInner {
    fn remove(&mut self, handle: &ConnectionHandle) -> Option<UserId> {
        let user_id = self.owners.remove(&handle.id())?;
        if let Some(set) = self.users.get_mut(&user_id) {
            set.remove(handle);
            if set.is_empty() {
                self.users.remove(&user_id);
            }
        }
        Some(user_id)
    }
}

/// User id to live connections, guarded by one lock over the whole structure.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handle` to `user_id`'s connections.
    ///
    /// Registering the same pair twice is a no-op. A handle belongs to one
    /// user at a time, so if it is currently owned by someone else it is moved.
    /// Returns `true` if the handle was not already registered for this user.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> bool {
        let mut inner = self.inner.lock();

        match inner.owners.get(&handle.id()).copied() {
            Some(owner) if owner == user_id => return false,
            Some(_) => {
                inner.remove(&handle);
            }
            None => {}
        }

        inner.owners.insert(handle.id(), user_id);
        inner.users.entry(user_id).or_default().insert(handle)
    }

    /// Remove `handle` from whichever user owns it.
    ///
    /// Returns the former owner, or `None` if the handle was not registered.
    pub fn unregister(&self, handle: &ConnectionHandle) -> Option<UserId> {
        self.inner.lock().remove(handle)
    }

    /// Snapshot of the user's live connections. Empty if the user is offline.
    pub fn connections_for(&self, user_id: UserId) -> Vec<ConnectionHandle> {
        self.inner
            .lock()
            .users
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids of every user with at least one connection, ascending.
    pub fn online_users(&self) -> Vec<UserId> {
        self.inner.lock().users.keys().copied().collect()
    }

    /// The user a connection is bound to, if any.
    pub fn owner_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.inner.lock().owners.get(&connection_id).copied()
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.inner.lock().users.contains_key(&user_id)
    }

    /// Number of registered connections across all users.
    pub fn connection_count(&self) -> usize {
        self.inner.lock().owners.len()
    }
}
