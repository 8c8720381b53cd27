//! Error types for the Scena framework.

use thiserror::Error;

/// Errors that can occur in Scena.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plugin '{plugin}' failed fatally: {message}")]
    PluginFatal { plugin: String, message: String },

    #[error("Plugin registration is sealed once the run has started")]
    SubscriptionsSealed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure returned by a plugin event handler.
///
/// A recoverable failure is isolated to the failing handler: the dispatcher
/// records it and the remaining handlers for the event still run. A fatal
/// failure propagates to the runner, which aborts the remaining run-set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Recoverable(String),

    #[error("{0}")]
    Fatal(String),
}

impl HandlerError {
    /// Creates a recoverable failure.
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self::Recoverable(message.into())
    }

    /// Creates a fatal-to-run failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Returns true if this failure aborts the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        match self {
            Self::Recoverable(message) | Self::Fatal(message) => message,
        }
    }
}
