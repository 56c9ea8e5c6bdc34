//! Facade status endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tether_control::{Lifecycle, Status};

use crate::state::ProbeState;

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Facade id, matching the `facade_id` field in logs.
    pub id: String,
    /// Type label of the facade.
    pub kind: String,
    /// Lifecycle status.
    pub status: Status,
    /// Upstream base URL.
    pub upstream: String,
    /// Registered command names.
    pub commands: Vec<String>,
}

/// Report the facade's lifecycle status without consulting the upstream.
pub async fn status(State(state): State<Arc<ProbeState>>) -> Json<StatusResponse> {
    let facade = &state.facade;

    Json(StatusResponse {
        id: facade.id().to_string(),
        kind: facade.kind().to_string(),
        status: facade.status(),
        upstream: facade.client().base_url().to_string(),
        commands: facade.command_names().map(str::to_string).collect(),
    })
}
