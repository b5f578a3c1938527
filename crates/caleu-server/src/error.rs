//! Server error types.

use thiserror::Error;

use caleu_providers::ProviderError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the coordinator's handle and sinks.
///
/// Refresh failures are not errors at this level: they are recorded in the
/// coordinator status and retried on the next tick.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The fetcher could not be built.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The coordinator loop has stopped.
    #[error("Coordinator is not running")]
    NotRunning,

    /// A desktop notification could not be shown.
    #[error("Notification error: {message}")]
    Notification { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a notification error.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ServerError::config("refresh interval must be positive").to_string(),
            "Configuration error: refresh interval must be positive"
        );
        assert_eq!(ServerError::NotRunning.to_string(), "Coordinator is not running");

        let provider = ProviderError::configuration("API key is empty").with_provider("caleu");
        assert_eq!(
            ServerError::from(provider).to_string(),
            "Provider error: [caleu] configuration_error: API key is empty"
        );
    }
}
