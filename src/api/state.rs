//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the task that owns the connection registry
    pub hub: ConnectionHub,
    /// Listener configuration, the address `serve` binds
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create an AppState with the default relay behaviour
    ///
    /// Spawns the hub task, so it must be called inside a tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_hub_config(config, HubConfig::default())
    }

    /// Create AppState with custom hub configuration
    pub fn with_hub_config(config: ServerConfig, hub_config: HubConfig) -> Self {
        Self {
            hub: ConnectionHub::new(hub_config),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count, 0 if the hub has stopped
    pub async fn ws_connection_count(&self) -> usize {
        self.hub.connection_count().await.unwrap_or(0)
    }
}
