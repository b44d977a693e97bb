//! API Routes
//!
//! Route handlers organized by functionality. The chat itself is served by
//! the WebSocket fallback, not by a route.

pub mod health;
