//! Broadcast Relay
//!
//! Copies one connection's inbound payload to every open member of the
//! registry. A failed send to one member never stops delivery to the rest,
//! and nothing is retried.

use super::messages::Payload;
use super::registry::{ConnectionId, ConnectionRegistry};

/// Whether the sending connection gets its own message back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Every open connection receives the payload, the sender included
    #[default]
    IncludeSender,
    /// Everybody except the sender receives the payload
    ExcludeSender,
}

impl EchoPolicy {
    pub fn from_echo_flag(echo_to_sender: bool) -> Self {
        if echo_to_sender {
            EchoPolicy::IncludeSender
        } else {
            EchoPolicy::ExcludeSender
        }
    }
}

/// Outcome of relaying one payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Connections the payload was queued for
    pub delivered: usize,
    /// Members that were closing, closed, or whose task had exited
    pub skipped: usize,
}

/// Forward `payload` to every open connection in `registry`
pub fn relay(
    registry: &ConnectionRegistry,
    source: &ConnectionId,
    payload: &Payload,
    policy: EchoPolicy,
) -> RelayReport {
    let mut report = RelayReport::default();

    for connection in registry.iter() {
        if policy == EchoPolicy::ExcludeSender && connection.id() == *source {
            continue;
        }

        if connection.is_open() && connection.send(payload.clone()) {
            report.delivered += 1;
        } else {
            report.skipped += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::registry::{Connection, ConnectionState};
    use tokio::sync::mpsc;

    fn connect(
        registry: &mut ConnectionRegistry,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(Connection::open(tx));
        (id, rx)
    }

    #[test]
    fn test_relay_reaches_everyone_including_sender() {
        let mut registry = ConnectionRegistry::new();
        let (a, mut rx_a) = connect(&mut registry);
        let (_b, mut rx_b) = connect(&mut registry);
        let (_c, mut rx_c) = connect(&mut registry);

        let payload = Payload::from("hi");
        let report = relay(&registry, &a, &payload, EchoPolicy::IncludeSender);

        assert_eq!(report, RelayReport { delivered: 3, skipped: 0 });
        assert_eq!(rx_a.try_recv().unwrap(), payload);
        assert_eq!(rx_b.try_recv().unwrap(), payload);
        assert_eq!(rx_c.try_recv().unwrap(), payload);
    }

    #[test]
    fn test_exclude_sender_policy() {
        let mut registry = ConnectionRegistry::new();
        let (a, mut rx_a) = connect(&mut registry);
        let (_b, mut rx_b) = connect(&mut registry);

        let report = relay(&registry, &a, &Payload::from("hi"), EchoPolicy::ExcludeSender);

        assert_eq!(report.delivered, 1);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap().as_str(), "hi");
    }

    #[test]
    fn test_failed_send_does_not_stop_others() {
        let mut registry = ConnectionRegistry::new();
        let (a, mut rx_a) = connect(&mut registry);
        let (_gone, rx_gone) = connect(&mut registry);
        let (_c, mut rx_c) = connect(&mut registry);
        drop(rx_gone);

        let report = relay(&registry, &a, &Payload::from("still here"), EchoPolicy::IncludeSender);

        assert_eq!(report, RelayReport { delivered: 2, skipped: 1 });
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
    }

    #[test]
    fn test_closing_connection_is_skipped() {
        let mut registry = ConnectionRegistry::new();
        let (tx, mut rx_closing) = mpsc::unbounded_channel();
        let closing = Connection::open(tx);
        closing.state_handle().set(ConnectionState::Closing);
        registry.register(closing);
        let (a, mut rx_a) = connect(&mut registry);

        let report = relay(&registry, &a, &Payload::from("bye"), EchoPolicy::IncludeSender);

        assert_eq!(report, RelayReport { delivered: 1, skipped: 1 });
        assert!(rx_closing.try_recv().is_err());
        assert!(rx_a.try_recv().is_ok());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ConnectionRegistry::new();
        let report = relay(
            &registry,
            &ConnectionId::new(),
            &Payload::from("anyone?"),
            EchoPolicy::IncludeSender,
        );
        assert_eq!(report, RelayReport::default());
    }

    #[test]
    fn test_echo_flag() {
        assert_eq!(EchoPolicy::from_echo_flag(true), EchoPolicy::IncludeSender);
        assert_eq!(EchoPolicy::from_echo_flag(false), EchoPolicy::ExcludeSender);
        assert_eq!(EchoPolicy::default(), EchoPolicy::IncludeSender);
    }
}
