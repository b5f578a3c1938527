//! Coordinator: snapshot store, refresh loop, change events, notifications.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use caleu_providers::caleu::{CalEuConfig, CalEuFetcher};
//! use caleu_server::{Coordinator, CoordinatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = CalEuFetcher::new(CalEuConfig::new("cal_live_...")?)?;
//!     let (coordinator, handle) =
//!         Coordinator::with_system_clock(CoordinatorConfig::default(), Arc::new(fetcher))?;
//!     let mut events = handle.subscribe();
//!     tokio::spawn(coordinator.run());
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{}", event.uid());
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod coordinator;
mod error;
mod notify;
mod store;

pub use config::{CoordinatorConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_REFRESH_INTERVAL};
pub use coordinator::{
    Availability, Coordinator, CoordinatorCommand, CoordinatorHandle, CoordinatorPhase,
    CoordinatorStatus, RefreshFailure, RefreshOutcome, RefreshReport, SharedStatus,
};
pub use error::{ServerError, ServerResult};
pub use notify::{NotifyConfig, NotifySink, notification_body, notification_summary};
pub use store::{SnapshotReader, SnapshotStore};
