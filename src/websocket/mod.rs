//! WebSocket Chat Relay
//!
//! Accepts WebSocket clients and rebroadcasts every text frame to all of them.
//!
//! ## Architecture
//!
//! - **Registry**: the set of connections, keyed by a unique handle
//! - **Relay**: fans one payload out to every open registry member
//! - **ConnectionHub**: the task that owns the registry and serializes access
//! - **Handler**: upgrades HTTP to WebSocket and runs one connection's lifecycle
//!
//! ## Usage
//!
//! Clients connect to any path that is not a probe. There is no envelope:
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3000');
//!
//! ws.onopen = () => ws.send('hello');
//! ws.onmessage = (event) => console.log('Received:', event.data);
//! ```

mod handler;
mod hub;
mod messages;
mod registry;
mod relay;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::Payload;
pub use registry::{Connection, ConnectionId, ConnectionRegistry, ConnectionState, SharedState};
pub use relay::{relay, EchoPolicy, RelayReport};
