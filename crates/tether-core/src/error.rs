//! Common error types for tether.
//!
//! This module provides the validation errors raised by the dependency bundle
//! types and the lifecycle state machine.

use thiserror::Error;

use crate::status::Status;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur when building or mutating dependency bundles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required value was absent or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The bundle does not carry a client.
    #[error("dependencies must include a client")]
    MissingClient,

    /// An extra payload uses a key reserved for lifecycle accessors.
    #[error("dependency key `{0}` is reserved")]
    ReservedKey(String),

    /// The requested status transition is not part of the state machine.
    #[error("invalid status transition: cannot transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: Status,
        /// The requested target status.
        to: Status,
    },
}

impl CoreError {
    /// Returns true if this error describes bad caller input rather than an
    /// invalid state machine request.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::MissingClient | Self::ReservedKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            CoreError::ReservedKey("status".into()).to_string(),
            "dependency key `status` is reserved"
        );
        assert_eq!(
            CoreError::InvalidTransition {
                from: Status::Closed,
                to: Status::Open
            }
            .to_string(),
            "invalid status transition: cannot transition from CLOSED to OPEN"
        );
    }

    #[test]
    fn input_errors() {
        assert!(CoreError::MissingClient.is_input_error());
        assert!(CoreError::ReservedKey("close".into()).is_input_error());
        assert!(!CoreError::InvalidTransition {
            from: Status::Open,
            to: Status::Closed
        }
        .is_input_error());
    }
}
