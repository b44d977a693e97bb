//! WebSocket Message Types
//!
//! The text payload carried by the relay and the commands understood by the
//! hub task. Payloads travel without any envelope: what a client sends is
//! exactly what every recipient gets.

use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

use super::registry::{Connection, ConnectionId};
use super::relay::RelayReport;

/// An immutable text payload as received on the wire
///
/// Clones share one allocation, so fanning a message out to N connections
/// costs N reference-count bumps rather than N copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(Arc<str>);

impl Payload {
    /// Wrap a text frame
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Payload {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commands sent from connection tasks to the hub task
///
/// The hub handles them strictly one at a time, which is what serializes
/// registry mutation against broadcasts.
pub(crate) enum HubCommand {
    /// Add an open connection to the registry
    Register {
        connection: Connection,
        reply: oneshot::Sender<ConnectionId>,
    },
    /// Remove a connection; unknown handles are ignored
    Deregister { id: ConnectionId },
    /// Relay a payload received on `source`
    Broadcast {
        source: ConnectionId,
        payload: Payload,
        reply: oneshot::Sender<RelayReport>,
    },
    /// Report the current registry size
    Count { reply: oneshot::Sender<usize> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_verbatim() {
        let text = "  héllo, wörld 👋\n";
        let payload = Payload::from(text);
        assert_eq!(payload.as_str(), text);
        assert_eq!(payload.to_string(), text);
        assert_eq!(payload.len(), text.len());
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::from(String::new());
        assert!(payload.is_empty());
        assert_eq!(payload.as_str(), "");
    }

    #[test]
    fn test_clones_share_allocation() {
        let payload = Payload::from("shared");
        let copy = payload.clone();
        assert!(std::ptr::eq(payload.as_str(), copy.as_str()));
    }
}
