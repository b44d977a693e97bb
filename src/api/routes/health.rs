//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Full health status. Fails with 503 if the connection hub has stopped.
pub async fn full_health(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let connections = state.hub.connection_count().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        connections,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_full_health_reports_connections() {
        let state = Arc::new(AppState::new(ServerConfig::default()));

        let Json(health) = full_health(State(state)).await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.connections, 0);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
