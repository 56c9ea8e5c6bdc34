//! Command invocation endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_control::Lifecycle;

use crate::error::ApiError;
use crate::state::ProbeState;

/// Request body for `POST /commands`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Name of the command to run.
    pub name: String,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Value,
}

/// Response body for `POST /commands`.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Name of the command that ran.
    pub name: String,
    /// The command's result.
    pub result: Value,
}

/// Run a facade command.
///
/// New commands are refused once the facade leaves `OPEN`, so a draining
/// probe only finishes work already in flight.
///
/// # Errors
///
/// - `404` for an unknown command
/// - `503` when the facade is closing or closed
/// - `502` when the command itself fails
pub async fn run_command(
    State(state): State<Arc<ProbeState>>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let facade = &state.facade;
    let status = facade.status();
    if !status.is_open() {
        return Err(ApiError::Unavailable(format!("facade is {status}")));
    }

    tracing::debug!(command = %request.name, "Running command");
    let result = facade.call(&request.name, request.args).await?;

    Ok(Json(CommandResponse {
        name: request.name,
        result,
    }))
}
