//! Probe application state.

use tether_control::Facade;

use crate::config::ProbeConfig;
use crate::upstream::Upstream;

/// Shared application state for the probe handlers.
#[derive(Debug, Clone)]
pub struct ProbeState {
    /// The facade wrapping the upstream client.
    pub facade: Facade<Upstream>,
    /// Probe configuration.
    pub config: ProbeConfig,
}

impl ProbeState {
    /// Create a new probe state.
    #[must_use]
    pub const fn new(facade: Facade<Upstream>, config: ProbeConfig) -> Self {
        Self { facade, config }
    }
}
