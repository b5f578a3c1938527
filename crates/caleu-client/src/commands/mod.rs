//! Subcommand implementations.

pub mod config;
pub mod fetch;
pub mod run;

use std::sync::Arc;

use tracing::debug;

use caleu_providers::BookingFetcher;
use caleu_providers::caleu::CalEuFetcher;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds the Cal.eu fetcher from the configuration.
pub(crate) fn build_fetcher(config: &ClientConfig) -> ClientResult<Arc<dyn BookingFetcher>> {
    let api_key = config.resolve_api_key()?;
    let fetcher = CalEuFetcher::new(config.fetcher_config(api_key)?)?;
    debug!(base_url = %fetcher.config().base_url, "Fetcher configured");
    Ok(Arc::new(fetcher))
}
