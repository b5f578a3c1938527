//! `caleu fetch`: one refresh cycle.

use chrono::Utc;

use caleu_server::{Coordinator, RefreshOutcome};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::summary::SnapshotSummary;

/// Runs one refresh and prints the snapshot summary.
pub async fn fetch(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let fetcher = super::build_fetcher(config)?;
    let (coordinator, handle) =
        Coordinator::with_system_clock(config.coordinator_config(), fetcher)?;

    let report = match coordinator.refresh().await {
        RefreshOutcome::Updated(report) => report,
        RefreshOutcome::Failed(failure) if failure.requires_reauth() => {
            return Err(ClientError::AuthRequired(failure.message));
        }
        RefreshOutcome::Failed(failure) => return Err(ClientError::Provider(failure.message)),
        RefreshOutcome::Discarded => {
            return Err(ClientError::Server("refresh was discarded".to_string()));
        }
    };

    let state = handle.current_snapshot();
    let snapshot = state
        .snapshot()
        .ok_or_else(|| ClientError::Server("no snapshot after a successful refresh".to_string()))?;
    let summary = SnapshotSummary::new(snapshot, report.dropped, Utc::now());

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| ClientError::Server(format!("failed to serialize summary: {}", e)))?;
        println!("{}", out);
    } else {
        println!("{}", summary.render());
    }
    Ok(())
}
