//! State Management
//!
//! Chat state and the WebSocket connection feeding it.

pub mod chat;
pub mod websocket;

pub use chat::{can_send, outgoing_text, provide_chat_state, ChatMessage, ChatState};
pub use websocket::{websocket_url, ChatSocket};
