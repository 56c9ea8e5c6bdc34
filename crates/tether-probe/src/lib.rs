//! HTTP sidecar exposing a tether facade around an upstream service.
//!
//! The probe wraps a `reqwest` client bound to one upstream in a
//! [`Facade`](tether_control::Facade), then serves the facade's lifecycle
//! over HTTP. On shutdown it closes the facade with a drain window so load
//! balancers see `503` on `/health` before the process exits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 tether-probe                 │
//! │  ┌────────────┐        ┌──────────────────┐  │
//! │  │   Router   │───────►│ Facade<Upstream> │  │
//! │  │ + Handlers │        │ ping / describe  │  │
//! │  └────────────┘        └────────┬─────────┘  │
//! └─────────────────────────────────┼────────────┘
//!                                   │ reqwest
//!                                   ▼
//!                            ┌────────────┐
//!                            │  Upstream  │
//!                            └────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tether_probe::{build_facade, create_router, ProbeConfig, ProbeState, Upstream};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig::default();
//! let facade = build_facade(Upstream::new(&config)?, &config)?;
//! let app = create_router(ProbeState::new(facade, config.clone()));
//!
//! let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod upstream;

pub use config::{ConfigError, ProbeConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use shutdown::{drain, shutdown_signal};
pub use state::ProbeState;
pub use upstream::{build_facade, Upstream};
