//! Error types for fetch operations.
//!
//! A fetch either succeeds with raw records or fails with exactly one
//! [`ProviderErrorCode`]. The coordinator uses the code to decide whether the
//! failure is transient (retry on the next tick) or needs a new credential.

use std::fmt;
use thiserror::Error;

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The credential was rejected (401/403).
    AuthenticationFailed,
    /// The API asked us to slow down (429).
    RateLimited,
    /// Connection, timeout, DNS or TLS failure.
    NetworkError,
    /// The API answered with a 5xx status.
    ServerError,
    /// The response could not be understood as a whole.
    InvalidResponse,
    /// The fetcher could not be built from its configuration.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true if the next scheduled attempt may succeed without any
    /// change on our side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns true if retrying is pointless until the credential is replaced.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Returns the snake_case name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::RateLimited => "rate_limited",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed fetch.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Name of the fetcher that failed (e.g. "caleu").
    provider: Option<String>,
    /// HTTP status of the rejected response, when there was one.
    http_status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates an error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            http_status: None,
            source: None,
        }
    }

    /// Classifies a non-success HTTP status.
    ///
    /// 401 and 403 mean the key was rejected, 429 is throttling and any 5xx
    /// is an outage on the API side. Everything else is a response we do not
    /// know how to handle.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            401 | 403 => ProviderErrorCode::AuthenticationFailed,
            429 => ProviderErrorCode::RateLimited,
            500..=599 => ProviderErrorCode::ServerError,
            _ => ProviderErrorCode::InvalidResponse,
        };
        Self::new(code, message).with_http_status(status)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Sets the fetcher name.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Records the HTTP status of the failed response.
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// See [`ProviderErrorCode::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// See [`ProviderErrorCode::requires_reauth`].
    pub fn requires_reauth(&self) -> bool {
        self.code.requires_reauth()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.http_status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// Result type for fetch operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
