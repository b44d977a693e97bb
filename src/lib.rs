//! # Live Chat
//!
//! A minimal real-time chat server: every text message a WebSocket client
//! sends is broadcast, unchanged, to all connected clients.
//!
//! ## Modules
//!
//! - [`websocket`]: Connection registry, broadcast relay and the hub task
//! - [`api`]: HTTP surface with Axum (WebSocket fallback and probes)
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livechat::{serve, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default().config;
//!     let state = AppState::with_hub_config(config.server, config.relay.hub_config());
//!
//!     // Clients connect to ws://<host>:3000
//!     serve(state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod websocket;

// Re-export top-level types for convenience
pub use api::{build_router, serve, serve_with_shutdown, ApiError, ApiResult, AppState};

pub use websocket::{
    websocket_handler, ConnectionHub, ConnectionId, ConnectionRegistry, ConnectionState,
    EchoPolicy, HubConfig, HubError, Payload, RelayReport,
};

pub use config::{Config, ConfigError, LoadedConfig, LoggingConfig, RelayConfig, ServerConfig};
