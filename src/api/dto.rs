//! Data Transfer Objects
//!
//! Response types for the probe endpoints.
//! Chat traffic itself never goes through JSON.

use serde::{Deserialize, Serialize};

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Connections currently in the registry
    pub connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
