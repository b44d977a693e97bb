//! WebSocket Connection Hub
//!
//! A single task owns the [`ConnectionRegistry`] and processes register,
//! deregister and broadcast commands in arrival order. Connection tasks talk
//! to it through a cloneable [`ConnectionHub`] handle, so the registry is
//! never touched from two places at once.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::messages::{HubCommand, Payload};
use super::registry::{Connection, ConnectionId, ConnectionRegistry};
use super::relay::{relay, EchoPolicy, RelayReport};

/// Configuration for the connection hub
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    /// Whether senders receive their own messages
    pub echo: EchoPolicy,
}

/// Handle to the hub task
///
/// The task stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct ConnectionHub {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl ConnectionHub {
    /// Spawn the hub task on the current tokio runtime
    pub fn new(config: HubConfig) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();

        let actor = HubActor {
            registry: ConnectionRegistry::new(),
            config,
            commands: receiver,
        };
        tokio::spawn(actor.run());

        Self { commands }
    }

    /// Register a connection whose handshake has completed
    pub async fn register(&self, connection: Connection) -> Result<ConnectionId, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Register { connection, reply })?;
        response.await.map_err(|_| HubError::Unavailable)
    }

    /// Remove a connection from future broadcasts
    pub fn deregister(&self, id: ConnectionId) {
        if self.send(HubCommand::Deregister { id }).is_err() {
            tracing::debug!(connection_id = %id, "Hub already stopped, nothing to deregister");
        }
    }

    /// Relay a payload received on `source` to every open connection
    pub async fn broadcast(
        &self,
        source: ConnectionId,
        payload: Payload,
    ) -> Result<RelayReport, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Broadcast {
            source,
            payload,
            reply,
        })?;
        response.await.map_err(|_| HubError::Unavailable)
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> Result<usize, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Count { reply })?;
        response.await.map_err(|_| HubError::Unavailable)
    }

    fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands
            .send(command)
            .map_err(|_| HubError::Unavailable)
    }
}

/// The task that exclusively owns the registry
struct HubActor {
    registry: ConnectionRegistry,
    config: HubConfig,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl HubActor {
    async fn run(mut self) {
        tracing::debug!(echo = ?self.config.echo, "Connection hub started");

        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }

        tracing::debug!(
            connections = self.registry.len(),
            "Connection hub stopped"
        );
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { connection, reply } => {
                let id = self.registry.register(connection);
                tracing::info!(
                    connection_id = %id,
                    connections = self.registry.len(),
                    "WebSocket client connected"
                );
                // The caller may have given up waiting; it cleans up by
                // deregistering, so a lost reply needs no handling here.
                let _ = reply.send(id);
            }
            HubCommand::Deregister { id } => {
                if self.registry.deregister(&id).is_some() {
                    tracing::info!(
                        connection_id = %id,
                        connections = self.registry.len(),
                        "WebSocket client disconnected"
                    );
                }
            }
            HubCommand::Broadcast {
                source,
                payload,
                reply,
            } => {
                let report = relay(&self.registry, &source, &payload, self.config.echo);
                tracing::trace!(
                    connection_id = %source,
                    delivered = report.delivered,
                    skipped = report.skipped,
                    "Relayed message"
                );
                let _ = reply.send(report);
            }
            HubCommand::Count { reply } => {
                let _ = reply.send(self.registry.len());
            }
        }
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Connection hub is not running")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::registry::ConnectionState;

    async fn connect(
        hub: &ConnectionHub,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(Connection::open(tx)).await.unwrap();
        (id, rx)
    }

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.echo, EchoPolicy::IncludeSender);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (id, _rx) = connect(&hub).await;
        assert_eq!(hub.connection_count().await.unwrap(), 1);

        hub.deregister(id);
        assert_eq!(hub.connection_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deregister_unknown_is_noop() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (_id, _rx) = connect(&hub).await;

        hub.deregister(ConnectionId::new());
        assert_eq!(hub.connection_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_to_all() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (a, mut rx_a) = connect(&hub).await;
        let (_b, mut rx_b) = connect(&hub).await;

        let report = hub.broadcast(a, Payload::from("hi")).await.unwrap();
        assert_eq!(report.delivered, 2);

        assert_eq!(rx_a.recv().await.unwrap().as_str(), "hi");
        assert_eq!(rx_b.recv().await.unwrap().as_str(), "hi");
    }

    #[tokio::test]
    async fn test_closed_connection_no_longer_receives() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (a, mut rx_a) = connect(&hub).await;
        let (b, mut rx_b) = connect(&hub).await;

        hub.broadcast(a, Payload::from("hi")).await.unwrap();
        assert_eq!(rx_b.recv().await.unwrap().as_str(), "hi");
        assert_eq!(rx_a.recv().await.unwrap().as_str(), "hi");

        hub.deregister(b);
        let report = hub.broadcast(a, Payload::from("bye")).await.unwrap();

        assert_eq!(report, RelayReport { delivered: 1, skipped: 0 });
        assert_eq!(rx_a.recv().await.unwrap().as_str(), "bye");
        // Deregistering dropped b's sender, so its channel is finished.
        assert!(rx_b.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_exclude_sender() {
        let hub = ConnectionHub::new(HubConfig {
            echo: EchoPolicy::ExcludeSender,
        });

        let (a, mut rx_a) = connect(&hub).await;
        let (_b, mut rx_b) = connect(&hub).await;

        let report = hub.broadcast(a, Payload::from("quiet")).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(rx_b.recv().await.unwrap().as_str(), "quiet");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closing_member_skipped_without_error() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (a, mut rx_a) = connect(&hub).await;
        let (tx, mut rx_closing) = mpsc::unbounded_channel();
        let closing = Connection::open(tx);
        let state = closing.state_handle();
        hub.register(closing).await.unwrap();
        state.set(ConnectionState::Closing);

        let report = hub.broadcast(a, Payload::from("x")).await.unwrap();
        assert_eq!(report, RelayReport { delivered: 1, skipped: 1 });
        assert!(rx_a.recv().await.is_some());
        assert!(rx_closing.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_payload_is_relayed() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (a, mut rx_a) = connect(&hub).await;

        hub.broadcast(a, Payload::from("")).await.unwrap();
        assert!(rx_a.recv().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_gets_new_handle() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (first, _rx1) = connect(&hub).await;
        hub.deregister(first);
        let (second, _rx2) = connect(&hub).await;

        assert_ne!(first, second);
        assert_eq!(hub.connection_count().await.unwrap(), 1);
    }
}
