//! UI Components
//!
//! Leptos components for the chat card.

pub mod composer;
pub mod message_list;
pub mod status;

pub use composer::Composer;
pub use message_list::MessageList;
pub use status::StatusDot;
