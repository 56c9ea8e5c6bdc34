//! Router configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{commands, health, status};
use crate::state::ProbeState;

/// Create the probe router.
///
/// # Routes
///
/// - `GET /health` - Facade health (`200` healthy, `503` otherwise)
/// - `GET /status` - Lifecycle status and registered commands
/// - `POST /commands` - Run a command: `{"name": "ping", "args": null}`
pub fn create_router(state: ProbeState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/status", get(status::status))
        .route("/commands", post(commands::run_command))
        .with_state(Arc::new(state))
}
