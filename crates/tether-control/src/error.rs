//! Error types for the facade and lifecycle controller.

use tether_core::CoreError;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur when building or driving a facade.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The definition failed validation; no facade was built.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A dependency write was rejected; the facade keeps its prior bundle.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No command is registered under the given name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A user-supplied command, close, or health check function failed.
    #[error("command `{name}` failed: {source}")]
    Command {
        /// The command that failed.
        name: String,
        /// The error returned by the user function.
        #[source]
        source: anyhow::Error,
    },

    /// The status state machine rejected a request.
    #[error("lifecycle error: {0}")]
    Lifecycle(CoreError),
}

impl ControlError {
    pub(crate) fn command(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Command {
            name: name.into(),
            source,
        }
    }

    /// Returns true if this error came from a user-supplied function.
    #[must_use]
    pub const fn is_command_failure(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// Returns true if a dependency write was rejected.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// The user function's error, if this is a command failure.
    #[must_use]
    pub fn command_source(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CoreError> for ControlError {
    fn from(err: CoreError) -> Self {
        if err.is_input_error() {
            Self::InvalidArgument(err.to_string())
        } else {
            Self::Lifecycle(err)
        }
    }
}
