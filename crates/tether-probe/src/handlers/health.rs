//! Health check endpoint.
//!
//! Reports the facade's health: `200 OK` while it is `OPEN` and the upstream
//! answers, `503 Service Unavailable` otherwise. Load balancers stop routing
//! to the probe as soon as a drain starts.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tether_control::{Lifecycle, Status};

use crate::state::ProbeState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Whether the facade reports itself healthy.
    pub healthy: bool,
    /// Lifecycle status of the facade.
    pub status: Status,
    /// Type label of the facade.
    pub kind: String,
    /// Why the health check could not be evaluated, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check handler.
///
/// # Example
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "healthy": true,
///   "status": "OPEN",
///   "kind": "http-upstream"
/// }
/// ```
pub async fn health(State(state): State<Arc<ProbeState>>) -> impl IntoResponse {
    let facade = &state.facade;
    let (healthy, error) = match facade.is_healthy().await {
        Ok(healthy) => (healthy, None),
        Err(err) => (false, Some(err.to_string())),
    };

    let response = HealthResponse {
        healthy,
        status: facade.status(),
        kind: facade.kind().to_string(),
        error,
    };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
