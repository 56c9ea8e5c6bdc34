//! Lifecycle status state machine.
//!
//! # State Machine
//!
//! ```text
//!     ┌──────────┐   close()   ┌───────────┐  close completes  ┌──────────┐
//!     │   OPEN   │────────────▶│  CLOSING  │──────────────────▶│  CLOSED  │
//!     └──────────┘             └───────────┘                   └──────────┘
//! ```
//!
//! Transitions never move backward. A close that fails leaves the status at
//! `CLOSING`; there is no transition out of it other than a later successful
//! completion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The lifecycle status of a wrapped client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The client is usable.
    #[default]
    Open,
    /// `close` has started and not yet completed successfully.
    Closing,
    /// The client has been released.
    Closed,
}

impl Status {
    /// The wire name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        }
    }

    /// Returns true if the client still accepts work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if a transition is part of the state machine.
    #[must_use]
    pub const fn can_transition(from: Self, to: Self) -> bool {
        matches!((from, to), (Self::Open, Self::Closing) | (Self::Closing, Self::Closed))
    }

    /// Validates a transition and returns the target status if valid.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the transition is not allowed.
    pub const fn validate_transition(from: Self, to: Self) -> Result<Self> {
        if Self::can_transition(from, to) {
            Ok(to)
        } else {
            Err(CoreError::InvalidTransition { from, to })
        }
    }

    /// Returns the statuses reachable in one step from this one.
    #[must_use]
    pub fn valid_transitions_from(self) -> Vec<Self> {
        match self {
            Self::Open => vec![Self::Closing],
            Self::Closing => vec![Self::Closed],
            Self::Closed => Vec::new(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
