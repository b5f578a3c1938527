//! Coordinator configuration.

use std::time::Duration;

use caleu_providers::BookingQuery;

use crate::error::{ServerError, ServerResult};

/// Default interval between scheduled refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Default capacity of the change event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for one coordinator instance.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Account label used in logs.
    pub name: String,

    /// Fixed interval between scheduled refreshes. The first refresh runs
    /// immediately at startup.
    pub refresh_interval: Duration,

    /// Events buffered per subscriber before a slow one starts lagging.
    pub event_capacity: usize,

    /// Query passed to the fetcher on every refresh.
    pub query: BookingQuery,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            query: BookingQuery::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Creates a configuration with the given refresh interval.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            ..Default::default()
        }
    }

    /// Builder: set the account label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Builder: set the booking query.
    pub fn with_query(mut self, query: BookingQuery) -> Self {
        self.query = query;
        self
    }

    /// Checks the values the coordinator cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.refresh_interval.is_zero() {
            return Err(ServerError::config("refresh interval must be positive"));
        }
        if self.event_capacity == 0 {
            return Err(ServerError::config("event capacity must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.query, BookingQuery::upcoming());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = CoordinatorConfig::new(Duration::from_secs(60))
            .with_name("work")
            .with_event_capacity(8)
            .with_query(BookingQuery::all());

        assert_eq!(config.name, "work");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.event_capacity, 8);
        assert!(config.query.status.is_none());
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(CoordinatorConfig::new(Duration::ZERO).validate().is_err());
        assert!(
            CoordinatorConfig::default()
                .with_event_capacity(0)
                .validate()
                .is_err()
        );
    }
}
