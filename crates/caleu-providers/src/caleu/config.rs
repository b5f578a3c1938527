//! Cal.eu fetcher configuration.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use url::Url;

/// Configuration for [`super::CalEuFetcher`].
#[derive(Clone)]
pub struct CalEuConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// API root, e.g. `https://api.cal.eu/v2`.
    pub base_url: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Fixed `cal-api-version` header. When unset, the current UTC date is
    /// sent, which selects the newest API version.
    pub api_version: Option<String>,
}

impl CalEuConfig {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.cal.eu/v2";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the public Cal.eu API.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in base URL; the `Result` mirrors
    /// [`CalEuConfig::with_base_url`].
    pub fn new(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(Self::DEFAULT_BASE_URL)?,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("caleu/{}", env!("CARGO_PKG_VERSION")),
            api_version: None,
        })
    }

    /// Points the fetcher at another API root (self-hosted instance, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.base_url = Url::parse(url.as_ref())?;
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Pins the `cal-api-version` header.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Returns the URL of an endpoint below the API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))
    }

    /// Value of the `cal-api-version` header for a request made on `today`.
    pub fn api_version_for(&self, today: NaiveDate) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Debug for CalEuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalEuConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CalEuConfig::new("cal_live_123").unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.cal.eu/v2");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("caleu/"));
        assert!(config.api_version.is_none());
    }

    #[test]
    fn endpoint_keeps_version_segment() {
        let config = CalEuConfig::new("k").unwrap();
        assert_eq!(
            config.endpoint("bookings").unwrap().as_str(),
            "https://api.cal.eu/v2/bookings"
        );

        let config = config.with_base_url("http://127.0.0.1:8080/v2/").unwrap();
        assert_eq!(
            config.endpoint("/schedules").unwrap().as_str(),
            "http://127.0.0.1:8080/v2/schedules"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(CalEuConfig::new("k").unwrap().with_base_url("not a url").is_err());
    }

    #[test]
    fn api_version_defaults_to_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let config = CalEuConfig::new("k").unwrap();
        assert_eq!(config.api_version_for(today), "2025-03-10");

        let pinned = config.with_api_version("2024-08-13");
        assert_eq!(pinned.api_version_for(today), "2024-08-13");
    }

    #[test]
    fn debug_hides_api_key() {
        let config = CalEuConfig::new("cal_live_secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("cal_live_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
