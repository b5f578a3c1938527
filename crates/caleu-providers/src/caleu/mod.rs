//! Cal.eu v2 API fetcher.
//!
//! # Example
//!
//! ```ignore
//! use caleu_providers::caleu::{CalEuConfig, CalEuFetcher};
//!
//! let config = CalEuConfig::new("cal_live_...")?;
//! let fetcher = CalEuFetcher::new(config)?;
//! let result = fetcher.fetch(BookingQuery::upcoming()).await?;
//! ```

mod client;
mod config;

pub use client::{API_VERSION_HEADER, CalEuFetcher};
pub use config::CalEuConfig;
