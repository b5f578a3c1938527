//! Client configuration.
//!
//! All settings live in one `config.toml`, by default at
//! `~/.config/caleu/config.toml`:
//!
//! ```toml
//! [account]
//! name = "work"
//! api_key = "env::CAL_EU_KEY"
//!
//! [refresh]
//! interval_secs = 300
//! status = "upcoming"
//!
//! [notifications]
//! enabled = true
//! ```
//!
//! `api_key` accepts secret references (see [`crate::secret`]). The
//! `CALEU_API_KEY` environment variable overrides it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use caleu_providers::BookingQuery;
use caleu_providers::caleu::CalEuConfig;
use caleu_server::{CoordinatorConfig, NotifyConfig};

use crate::error::{ClientError, ClientResult};
use crate::secret::{self, SecretRef};

/// Environment variable that overrides `account.api_key`.
pub const API_KEY_ENV: &str = "CALEU_API_KEY";

const REDACTED: &str = "<redacted>";

/// Configuration for the caleu client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub account: AccountSettings,
    pub refresh: RefreshSettings,
    pub notifications: NotificationSettings,
}

/// The Cal.eu account to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Label used in logs.
    pub name: String,

    /// API key or a secret reference to it.
    pub api_key: Option<String>,

    /// API root override (self-hosted instances).
    pub base_url: Option<String>,

    /// Pinned `cal-api-version`.
    pub api_version: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            api_key: None,
            base_url: None,
            api_version: None,
            timeout_secs: CalEuConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Refresh schedule and query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Seconds between scheduled refreshes.
    pub interval_secs: u64,

    /// Booking status filter; an empty string fetches every booking.
    pub status: String,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: caleu_server::DEFAULT_REFRESH_INTERVAL.as_secs(),
            status: caleu_providers::DEFAULT_STATUS_FILTER.to_string(),
        }
    }
}

/// Desktop notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub timeout_secs: u32,
    pub urgency: Option<String>,
    pub icon_path: Option<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        let defaults = NotifyConfig::default();
        Self {
            enabled: defaults.enabled,
            timeout_secs: defaults.timeout_secs,
            urgency: None,
            icon_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Parses a `config.toml` document.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("caleu")
    }

    /// Resolves the API key, preferring `$CALEU_API_KEY`.
    pub fn resolve_api_key(&self) -> ClientResult<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    pub(crate) fn resolve_api_key_with(&self, env_override: Option<String>) -> ClientResult<String> {
        if let Some(key) = env_override.filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }

        let value = self.account.api_key.as_deref().ok_or_else(|| {
            ClientError::Config(format!(
                "no API key configured; set account.api_key in config.toml or {}",
                API_KEY_ENV
            ))
        })?;

        secret::resolve(value)
            .map_err(|e| ClientError::Config(format!("invalid account.api_key: {}", e)))
    }

    /// Builds the fetcher configuration with the given API key.
    pub fn fetcher_config(&self, api_key: String) -> ClientResult<CalEuConfig> {
        let invalid_url = |e: url::ParseError| ClientError::Config(format!("invalid base_url: {}", e));

        let mut config = CalEuConfig::new(api_key)
            .map_err(invalid_url)?
            .with_timeout(Duration::from_secs(self.account.timeout_secs));

        if let Some(ref base_url) = self.account.base_url {
            config = config.with_base_url(base_url).map_err(invalid_url)?;
        }
        if let Some(ref version) = self.account.api_version {
            config = config.with_api_version(version);
        }
        Ok(config)
    }

    /// Builds the coordinator configuration.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let status = self.refresh.status.trim();
        let query = if status.is_empty() {
            BookingQuery::all()
        } else {
            BookingQuery::all().with_status(status)
        };

        CoordinatorConfig::new(Duration::from_secs(self.refresh.interval_secs))
            .with_name(&self.account.name)
            .with_query(query)
    }

    /// Builds the notification sink configuration.
    pub fn notify_config(&self) -> NotifyConfig {
        let settings = &self.notifications;
        let mut config = NotifyConfig::default()
            .with_enabled(settings.enabled)
            .with_timeout(settings.timeout_secs);
        if let Some(ref urgency) = settings.urgency {
            config = config.with_urgency(urgency);
        }
        if let Some(ref icon) = settings.icon_path {
            config = config.with_icon_path(icon);
        }
        config
    }

    /// Returns a copy safe to print: a literal API key is replaced, secret
    /// references are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref key) = config.account.api_key
            && !SecretRef::parse(key).is_reference()
        {
            config.account.api_key = Some(REDACTED.to_string());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.account.name, "default");
        assert!(config.account.api_key.is_none());
        assert_eq!(config.refresh.interval_secs, 300);
        assert_eq!(config.refresh.status, "upcoming");
        assert!(config.notifications.enabled);
    }

    #[test]
    fn parses_full_file() {
        let config = ClientConfig::parse(
            r#"
            [account]
            name = "work"
            api_key = "env::CAL_EU_KEY"
            base_url = "https://cal.example.org/api/v2"
            api_version = "2024-08-13"

            [refresh]
            interval_secs = 120
            status = "unconfirmed"

            [notifications]
            enabled = false
            urgency = "critical"
            "#,
        )
        .unwrap();

        assert_eq!(config.account.name, "work");
        assert_eq!(config.account.api_key.as_deref(), Some("env::CAL_EU_KEY"));
        assert_eq!(config.account.timeout_secs, 30);
        assert_eq!(config.refresh.interval_secs, 120);
        assert!(!config.notifications.enabled);
        assert_eq!(config.notifications.timeout_secs, 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ClientConfig::parse("[account]\napi_key = \"cal_live_1\"\n").unwrap();
        assert_eq!(config.refresh, RefreshSettings::default());
        assert_eq!(config.notifications, NotificationSettings::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let err = ClientConfig::parse("[refresh]\ninterval_secs = \"often\"").unwrap_err();
        assert!(err.contains("failed to parse config"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh]\ninterval_secs = 60").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.refresh.interval_secs, 60);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn env_override_wins() {
        let mut config = ClientConfig::default();
        config.account.api_key = Some("cal_live_file".to_string());

        assert_eq!(
            config.resolve_api_key_with(Some("cal_live_env".into())).unwrap(),
            "cal_live_env"
        );
        assert_eq!(config.resolve_api_key_with(None).unwrap(), "cal_live_file");
        assert_eq!(
            config.resolve_api_key_with(Some("  ".into())).unwrap(),
            "cal_live_file"
        );
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = ClientConfig::default().resolve_api_key_with(None).unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg.contains(API_KEY_ENV)));
    }

    #[test]
    fn builds_component_configs() {
        let config = ClientConfig::parse(
            r#"
            [account]
            name = "work"
            base_url = "http://127.0.0.1:9000/v2"
            timeout_secs = 5

            [refresh]
            interval_secs = 90
            status = ""
            "#,
        )
        .unwrap();

        let fetcher = config.fetcher_config("k".into()).unwrap();
        assert_eq!(fetcher.base_url.as_str(), "http://127.0.0.1:9000/v2");
        assert_eq!(fetcher.timeout, Duration::from_secs(5));

        let coordinator = config.coordinator_config();
        assert_eq!(coordinator.name, "work");
        assert_eq!(coordinator.refresh_interval, Duration::from_secs(90));
        assert!(coordinator.query.status.is_none());

        assert!(config.notify_config().enabled);
    }

    #[test]
    fn bad_base_url_is_a_config_error() {
        let mut config = ClientConfig::default();
        config.account.base_url = Some("not a url".into());
        assert!(matches!(config.fetcher_config("k".into()), Err(ClientError::Config(_))));
    }

    #[test]
    fn redaction_hides_literal_keys_only() {
        let mut config = ClientConfig::default();
        config.account.api_key = Some("cal_live_secret".into());
        assert_eq!(config.redacted().account.api_key.as_deref(), Some("<redacted>"));

        config.account.api_key = Some("pass::cal/eu".into());
        assert_eq!(config.redacted().account.api_key.as_deref(), Some("pass::cal/eu"));

        let dumped = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(dumped.contains("[account]"));
    }
}
