//! BookingFetcher trait definition.
//!
//! A fetcher turns a [`BookingQuery`] into raw booking records. Credentials
//! are bound into the fetcher when it is built, so the coordinator only ever
//! passes the query.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use caleu_core::Schedule;

use crate::error::ProviderResult;

/// Default booking status filter: bookings that have not concluded yet.
pub const DEFAULT_STATUS_FILTER: &str = "upcoming";

/// Query parameters for a booking fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingQuery {
    /// Value of the `status` query parameter; `None` fetches everything.
    pub status: Option<String>,
}

impl Default for BookingQuery {
    fn default() -> Self {
        Self::upcoming()
    }
}

impl BookingQuery {
    /// Only bookings that have not concluded yet.
    pub fn upcoming() -> Self {
        Self {
            status: Some(DEFAULT_STATUS_FILTER.to_string()),
        }
    }

    /// No status filter.
    pub fn all() -> Self {
        Self { status: None }
    }

    /// Builder: set the status filter.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Returns the query string pairs for the bookings endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.status
            .iter()
            .map(|status| ("status", status.clone()))
            .collect()
    }
}

/// Result of one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// Raw booking records, one JSON value per booking.
    pub bookings: Vec<Value>,
    /// Schedules fetched in the same request cycle.
    pub schedules: Vec<Schedule>,
}

impl FetchResult {
    /// Creates a result with bookings only.
    pub fn with_bookings(bookings: Vec<Value>) -> Self {
        Self {
            bookings,
            schedules: Vec::new(),
        }
    }

    /// Builder: set schedules.
    pub fn with_schedules(mut self, schedules: Vec<Schedule>) -> Self {
        self.schedules = schedules;
        self
    }
}

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of raw booking records.
///
/// # Example Implementation
///
/// ```ignore
/// struct FixtureFetcher(Vec<serde_json::Value>);
///
/// impl BookingFetcher for FixtureFetcher {
///     fn name(&self) -> &str { "fixture" }
///
///     fn fetch(&self, _query: BookingQuery) -> BoxFuture<'_, ProviderResult<FetchResult>> {
///         let bookings = self.0.clone();
///         Box::pin(async move { Ok(FetchResult::with_bookings(bookings)) })
///     }
/// }
/// ```
pub trait BookingFetcher: Send + Sync {
    /// Short name used in logs and errors (e.g. "caleu").
    fn name(&self) -> &str;

    /// Fetches the bookings matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`crate::ProviderError`] when the response as a
    /// whole cannot be obtained. Individual bad records are not errors.
    fn fetch(&self, query: BookingQuery) -> BoxFuture<'_, ProviderResult<FetchResult>>;
}
