//! `caleu run`: the coordinator in the foreground.
//!
//! Starts the refresh loop, prints every new booking, optionally shows
//! desktop notifications, and stops on Ctrl-C.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use caleu_core::ChangeEvent;
use caleu_server::{Coordinator, NotifySink};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::summary::{SnapshotSummary, render_event};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(config: &ClientConfig, json: bool, notify: bool) -> ClientResult<()> {
    let fetcher = super::build_fetcher(config)?;
    let (coordinator, handle) =
        Coordinator::with_system_clock(config.coordinator_config(), fetcher)?;

    let mut events = handle.subscribe();
    let mut snapshots = handle.watch_snapshot();

    let notify_task = if notify && config.notifications.enabled {
        let sink = NotifySink::new(config.notify_config());
        Some(tokio::spawn(sink.run(handle.subscribe())))
    } else {
        None
    };

    let coordinator_task = tokio::spawn(coordinator.run());
    info!(account = %config.account.name, "Watching bookings, press Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event, json)?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event output lagged"),
                Err(RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = state.snapshot() {
                    let status = handle.status().await;
                    let summary = SnapshotSummary::with_status(snapshot, &status, Utc::now());
                    info!(
                        total = summary.total,
                        unconfirmed = summary.unconfirmed,
                        dropped = summary.dropped,
                        next = summary.next.as_ref().map(|n| n.title.as_str()).unwrap_or("-"),
                        "Snapshot updated"
                    );
                }
            },
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, coordinator_task).await {
        Ok(Ok(())) => info!("Coordinator stopped"),
        Ok(Err(e)) => warn!(error = %e, "Coordinator task failed"),
        Err(_) => warn!("Coordinator did not stop in time"),
    }
    if let Some(task) = notify_task {
        task.abort();
    }

    let status = handle.status().await;
    info!(
        refreshes = status.refresh_count,
        events = status.events_emitted,
        dropped = status.dropped_records,
        "Session finished"
    );
    Ok(())
}

fn print_event(event: &ChangeEvent, json: bool) -> ClientResult<()> {
    if json {
        let line = serde_json::to_string(event)
            .map_err(|e| ClientError::Server(format!("failed to serialize event: {}", e)))?;
        println!("{}", line);
    } else {
        println!("{}", render_event(event));
    }
    Ok(())
}
