//! HTTP fetcher for the Cal.eu v2 API.
//!
//! Each fetch issues two GET requests: `/bookings` (filtered by the query's
//! status) and `/schedules`. A bookings failure fails the fetch. A schedules
//! failure is only fatal when the credential was rejected; anything else is
//! logged and yields an empty schedule list.

use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, trace, warn};

use caleu_core::Schedule;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::fetcher::{BookingFetcher, BookingQuery, BoxFuture, FetchResult};

use super::config::CalEuConfig;

/// Header carrying the requested API version.
pub const API_VERSION_HEADER: &str = "cal-api-version";

/// Fetches bookings and schedules over HTTPS.
pub struct CalEuFetcher {
    client: Client,
    config: CalEuConfig,
}

impl CalEuFetcher {
    /// Fetcher name used in logs and errors.
    pub const NAME: &'static str = "caleu";

    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is empty or the HTTP
    /// client cannot be created.
    pub fn new(config: CalEuConfig) -> ProviderResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::configuration("API key is empty").with_provider(Self::NAME));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_provider(Self::NAME)
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CalEuConfig {
        &self.config
    }

    /// Fetches the raw booking records.
    pub async fn fetch_bookings(&self, query: &BookingQuery) -> ProviderResult<Vec<Value>> {
        let url = self.endpoint("bookings")?;
        let request = self.client.get(url).query(&query.query_pairs());
        let body = self.send(request).await?;
        let bookings = parse_bookings_body(&body)?;
        debug!(count = bookings.len(), "Fetched bookings");
        Ok(bookings)
    }

    /// Fetches the account's schedules.
    ///
    /// Only a rejected credential is an error.
    pub async fn fetch_schedules(&self) -> ProviderResult<Vec<Schedule>> {
        let url = self.endpoint("schedules")?;
        let result = match self.send(self.client.get(url)).await {
            Ok(body) => parse_schedules_body(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(schedules) => {
                debug!(count = schedules.len(), "Fetched schedules");
                Ok(schedules)
            }
            Err(e) if e.code() == ProviderErrorCode::AuthenticationFailed => {
                Err(e.with_provider(Self::NAME))
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch schedules, continuing without them");
                Ok(Vec::new())
            }
        }
    }

    fn endpoint(&self, path: &str) -> ProviderResult<url::Url> {
        self.config.endpoint(path).map_err(|e| {
            ProviderError::configuration(format!("Invalid endpoint URL for {}: {}", path, e))
                .with_provider(Self::NAME)
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(
                API_VERSION_HEADER,
                self.config.api_version_for(Utc::now().date_naive()),
            )
    }

    async fn send(&self, request: RequestBuilder) -> ProviderResult<String> {
        let response = self.authorize(request).send().await.map_err(|e| {
            ProviderError::network(format!("Request failed: {}", e))
                .with_provider(Self::NAME)
                .with_source(e)
        })?;

        handle_response(response)
            .await
            .map_err(|e| e.with_provider(Self::NAME))
    }
}

impl BookingFetcher for CalEuFetcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, query: BookingQuery) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        Box::pin(async move {
            let bookings = self.fetch_bookings(&query).await?;
            let schedules = self.fetch_schedules().await?;
            Ok(FetchResult::with_bookings(bookings).with_schedules(schedules))
        })
    }
}

async fn handle_response(response: Response) -> ProviderResult<String> {
    let status = response.status();
    trace!(status = %status, url = %response.url(), "Received response");

    if status.is_success() {
        return response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("Failed to read response: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Maps a non-success HTTP status to an error.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "API key rejected".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests".to_string(),
        s if s.is_server_error() => format!("Server error: {}", body),
        s => {
            warn!(status = %s, body = %body, "Unexpected response status");
            format!("Unexpected response: {}", body)
        }
    };
    ProviderError::from_http_status(status.as_u16(), message)
}

/// Extracts the booking list from a response body.
///
/// Accepts `{"data": {"bookings": [...]}}` and `{"data": [...]}`.
pub(crate) fn parse_bookings_body(body: &str) -> ProviderResult<Vec<Value>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("Response is not JSON: {}", e)).with_source(e)
    })?;

    match value.get("data") {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Object(data)) => match data.get("bookings") {
            Some(Value::Array(items)) => Ok(items.clone()),
            _ => Err(ProviderError::invalid_response(
                "Response `data` has no `bookings` array",
            )),
        },
        _ => Err(ProviderError::invalid_response("Response has no `data` field")),
    }
}

/// Extracts schedules from a response body, skipping entries that do not
/// decode.
pub(crate) fn parse_schedules_body(body: &str) -> ProviderResult<Vec<Schedule>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("Response is not JSON: {}", e)).with_source(e)
    })?;

    let Some(Value::Array(items)) = value.get("data") else {
        return Err(ProviderError::invalid_response(
            "Schedules response has no `data` array",
        ));
    };

    Ok(items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Schedule>(item.clone()) {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                debug!(error = %e, "Skipping undecodable schedule");
                None
            }
        })
        .collect())
}
