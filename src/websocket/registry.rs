//! Connection Registry
//!
//! The set of client connections known to the server. A connection is
//! inserted once its WebSocket handshake has completed and removed when it
//! closes. Membership does not imply the connection is still usable: close
//! notifications race with sends, so callers recheck [`Connection::is_open`]
//! before every send.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::Payload;

/// Unique handle naming a single connection instance
///
/// A client that reconnects gets a new handle; nothing is resumed.
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

/// Lifecycle of a connection, mirroring the WebSocket ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// Connection state shared between the connection task (writer) and the
/// registry (reader)
#[derive(Debug)]
pub struct SharedState(AtomicU8);

impl SharedState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Server-side record of one client connection
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Payload>,
    state: Arc<SharedState>,
}

impl Connection {
    /// Create a record for a connection whose handshake has just completed
    ///
    /// Payloads handed to [`Connection::send`] come out of the receiver that
    /// pairs with `outbound`.
    pub fn open(outbound: mpsc::UnboundedSender<Payload>) -> Self {
        Self {
            id: ConnectionId::new(),
            outbound,
            state: Arc::new(SharedState::new(ConnectionState::Open)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Handle the connection task keeps to publish state transitions
    pub fn state_handle(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    /// Open and still draining its outbound channel
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open && !self.outbound.is_closed()
    }

    /// Queue a payload for this connection
    ///
    /// Returns false if the connection task has already gone away.
    pub fn send(&self, payload: Payload) -> bool {
        self.outbound.send(payload).is_ok()
    }
}

/// Unordered set of connections keyed by handle
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection and return its handle
    pub fn register(&mut self, connection: Connection) -> ConnectionId {
        let id = connection.id();
        self.connections.insert(id, connection);
        id
    }

    /// Remove a connection. Removing an unknown handle is a no-op.
    pub fn deregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All members, open or not, in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_starts_open() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = Connection::open(tx);
        assert_eq!(connection.state(), ConnectionState::Open);
        assert!(connection.is_open());
    }

    #[test]
    fn test_state_handle_updates_connection() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = Connection::open(tx);
        let handle = connection.state_handle();

        handle.set(ConnectionState::Closing);
        assert_eq!(connection.state(), ConnectionState::Closing);
        assert!(!connection.is_open());

        handle.set(ConnectionState::Closed);
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_dropped_receiver_means_not_open() {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Connection::open(tx);
        drop(rx);

        assert_eq!(connection.state(), ConnectionState::Open);
        assert!(!connection.is_open());
        assert!(!connection.send(Payload::from("lost")));
    }

    #[test]
    fn test_register_deregister() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = registry.register(Connection::open(tx));
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);

        let removed = registry.deregister(&id);
        assert_eq!(removed.map(|c| c.id()), Some(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_deregister_unknown_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(Connection::open(tx));

        assert!(registry.deregister(&ConnectionId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut registry = ConnectionRegistry::new();
        for _ in 0..64 {
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.register(Connection::open(tx));
        }
        assert_eq!(registry.len(), 64);
    }
}
