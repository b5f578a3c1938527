//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Fetcher or refresh failure.
    Provider(String),
    /// The API key was rejected.
    AuthRequired(String),
    /// Coordinator error.
    Server(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::Server(msg) => write!(f, "coordinator error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<caleu_providers::ProviderError> for ClientError {
    fn from(err: caleu_providers::ProviderError) -> Self {
        if err.requires_reauth() {
            Self::AuthRequired(err.to_string())
        } else {
            Self::Provider(err.to_string())
        }
    }
}

impl From<caleu_server::ServerError> for ClientError {
    fn from(err: caleu_server::ServerError) -> Self {
        match err {
            caleu_server::ServerError::Config { message } => Self::Config(message),
            caleu_server::ServerError::Provider(e) => e.into(),
            other => Self::Server(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caleu_providers::ProviderError;

    #[test]
    fn auth_failures_map_to_auth_required() {
        let err: ClientError = ProviderError::authentication("API key rejected (401)").into();
        assert!(matches!(err, ClientError::AuthRequired(_)));

        let err: ClientError = ProviderError::network("timed out").into();
        assert!(matches!(err, ClientError::Provider(_)));
    }

    #[test]
    fn server_config_errors_stay_config_errors() {
        let err: ClientError = caleu_server::ServerError::config("bad interval").into();
        assert_eq!(err.to_string(), "configuration error: bad interval");
    }
}
