//! Poll-reconcile-notify coordinator.
//!
//! One [`Coordinator`] per account. It owns the write side of the
//! [`SnapshotStore`], runs the refresh loop on a fixed schedule, diffs each
//! new snapshot against the previous one and broadcasts a
//! [`ChangeEvent::NewBooking`] per uid that was not there before.
//!
//! ```text
//!  tick / request_refresh ──► fetch ──► normalize ──► store.replace ──► events
//! ```
//!
//! The loop runs in a single task and awaits each refresh inline, so at most
//! one fetch is in flight. Requests that arrive meanwhile collapse into a
//! single follow-up refresh, and ticks missed during a slow refresh are
//! skipped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{RwLock, broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use caleu_core::{ChangeEvent, Clock, Snapshot, SnapshotState, SystemClock};
use caleu_providers::{BookingFetcher, ProviderError, ProviderErrorCode, normalize_bookings};

use crate::config::CoordinatorConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::{SnapshotReader, SnapshotStore};

const COMMAND_CAPACITY: usize = 16;

/// Commands accepted by a running coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorCommand {
    /// Refresh now, or once more after the refresh already in flight.
    Refresh,
    /// Stop the loop.
    Stop,
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// No refresh has succeeded yet.
    #[default]
    Uninitialized,
    /// A fetch is in flight.
    Refreshing,
    /// Waiting for the next trigger.
    Idle,
    /// Torn down. Terminal.
    Disabled,
}

impl CoordinatorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Refreshing => "refreshing",
            Self::Idle => "idle",
            Self::Disabled => "disabled",
        }
    }
}

/// A refresh cycle that failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub code: ProviderErrorCode,
    pub message: String,
    /// When the failed attempt started.
    pub at: DateTime<Utc>,
}

impl RefreshFailure {
    fn from_error(error: &ProviderError, at: DateTime<Utc>) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            at,
        }
    }

    /// True when the credential must be replaced before a refresh can
    /// succeed.
    pub fn requires_reauth(&self) -> bool {
        self.code.requires_reauth()
    }
}

/// Summary of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Records in the new snapshot.
    pub total: usize,
    /// Records dropped by normalization.
    pub dropped: usize,
    /// Uids for which a `NewBooking` event was emitted, in emission order.
    pub new_uids: Vec<String>,
    /// True for the first successful refresh since startup.
    pub first_load: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The store was replaced.
    Updated(RefreshReport),
    /// The fetch failed; the store is untouched.
    Failed(RefreshFailure),
    /// The coordinator was torn down before the result could be applied.
    Discarded,
}

/// Observable coordinator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStatus {
    pub phase: CoordinatorPhase,
    /// Successful refreshes since startup.
    pub refresh_count: u64,
    /// Failed refreshes since the last success.
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    /// Failure of the most recent attempt; cleared by a success.
    pub last_error: Option<RefreshFailure>,
    /// Records dropped by normalization since startup.
    pub dropped_records: u64,
    /// Records dropped by the last successful refresh.
    pub last_dropped: usize,
    /// `NewBooking` events emitted since startup.
    pub events_emitted: u64,
}

impl CoordinatorStatus {
    /// Moves to `phase` unless the coordinator is already torn down.
    fn transition(&mut self, phase: CoordinatorPhase) {
        if self.phase != CoordinatorPhase::Disabled {
            self.phase = phase;
        }
    }

    fn record_success(&mut self, report: &RefreshReport) {
        self.refresh_count += 1;
        self.consecutive_failures = 0;
        self.last_success = Some(report.fetched_at);
        self.last_attempt = self.last_success;
        self.last_error = None;
        self.dropped_records += report.dropped as u64;
        self.last_dropped = report.dropped;
        self.events_emitted += report.new_uids.len() as u64;
        self.transition(CoordinatorPhase::Idle);
    }

    fn record_failure(&mut self, failure: RefreshFailure, store_ready: bool) {
        self.consecutive_failures += 1;
        self.last_attempt = Some(failure.at);
        self.last_error = Some(failure);
        self.transition(if store_ready {
            CoordinatorPhase::Idle
        } else {
            CoordinatorPhase::Uninitialized
        });
    }
}

/// Shared coordinator status.
pub type SharedStatus = Arc<RwLock<CoordinatorStatus>>;

/// What a consumer can show right now.
#[derive(Debug, Clone)]
pub enum Availability {
    /// Nothing has been attempted yet, or the first attempt is in flight.
    NoDataYet,
    /// Every attempt so far failed; carries the latest failure.
    FirstRefreshFailed(RefreshFailure),
    /// The latest good snapshot. Stays available while later refreshes fail.
    Ready(Arc<Snapshot>),
}

impl Availability {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// The poll-reconcile-notify coordinator for one account.
pub struct Coordinator {
    config: CoordinatorConfig,
    fetcher: Arc<dyn BookingFetcher>,
    clock: Arc<dyn Clock>,
    store: SnapshotStore,
    events: broadcast::Sender<ChangeEvent>,
    status: SharedStatus,
    command_rx: mpsc::Receiver<CoordinatorCommand>,
}

impl Coordinator {
    /// Creates a coordinator with an injected fetcher and clock, and the
    /// handle consumers use to reach it.
    pub fn new(
        config: CoordinatorConfig,
        fetcher: Arc<dyn BookingFetcher>,
        clock: Arc<dyn Clock>,
    ) -> ServerResult<(Self, CoordinatorHandle)> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let coordinator = Self {
            config,
            fetcher,
            clock,
            store: SnapshotStore::new(),
            events,
            status: Arc::new(RwLock::new(CoordinatorStatus::default())),
            command_rx,
        };
        let handle = CoordinatorHandle {
            command_tx,
            snapshots: coordinator.store.reader(),
            events: coordinator.events.clone(),
            status: Arc::clone(&coordinator.status),
        };
        Ok((coordinator, handle))
    }

    /// Creates a coordinator that reads the system clock.
    pub fn with_system_clock(
        config: CoordinatorConfig,
        fetcher: Arc<dyn BookingFetcher>,
    ) -> ServerResult<(Self, CoordinatorHandle)> {
        Self::new(config, fetcher, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Runs one refresh cycle.
    ///
    /// Failures are recorded in the status and returned, never propagated.
    pub async fn refresh(&self) -> RefreshOutcome {
        let first_load = !self.store.current().is_ready();
        {
            let mut status = self.status.write().await;
            if status.phase == CoordinatorPhase::Disabled {
                return RefreshOutcome::Discarded;
            }
            status.transition(CoordinatorPhase::Refreshing);
        }

        let started = self.clock.now();
        debug!(
            account = %self.config.name,
            fetcher = self.fetcher.name(),
            first_load,
            "Starting refresh"
        );
        let result = self.fetcher.fetch(self.config.query.clone()).await;

        // Held until the status is updated, so teardown either happens before
        // the result is applied or after it has been applied in full.
        let mut status = self.status.write().await;
        if status.phase == CoordinatorPhase::Disabled {
            debug!(account = %self.config.name, "Coordinator disabled, discarding fetch result");
            return RefreshOutcome::Discarded;
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                let failure = RefreshFailure::from_error(&e, started);
                warn!(
                    account = %self.config.name,
                    code = %failure.code,
                    requires_reauth = failure.requires_reauth(),
                    error = %e,
                    "Refresh failed"
                );
                status.record_failure(failure.clone(), !first_load);
                return RefreshOutcome::Failed(failure);
            }
        };

        let normalized = normalize_bookings(fetched.bookings);
        let dropped = normalized.dropped.len();
        if dropped > 0 {
            warn!(account = %self.config.name, dropped, "Dropped malformed booking records");
        }

        let fetched_at = self.clock.now();
        let (snapshot, previous) =
            self.store
                .replace(normalized.records, fetched.schedules, fetched_at);

        let mut new_uids = Vec::new();
        if !first_load {
            for record in snapshot.added_since(&previous) {
                info!(
                    account = %self.config.name,
                    uid = %record.uid,
                    title = %record.title,
                    start = %record.start,
                    "New booking"
                );
                // No subscribers is not an error.
                let _ = self.events.send(ChangeEvent::from(record));
                new_uids.push(record.uid.clone());
            }
        }

        let report = RefreshReport {
            total: snapshot.len(),
            dropped,
            new_uids,
            first_load,
            fetched_at,
        };
        status.record_success(&report);

        info!(
            account = %self.config.name,
            total = report.total,
            dropped = report.dropped,
            new = report.new_uids.len(),
            "Refresh completed"
        );
        RefreshOutcome::Updated(report)
    }

    /// Runs the refresh loop until [`CoordinatorHandle::shutdown`] is called
    /// or every handle is dropped.
    ///
    /// The first refresh starts immediately.
    pub async fn run(mut self) {
        let period = self.config.refresh_interval;
        info!(
            account = %self.config.name,
            interval_secs = period.as_secs(),
            "Coordinator started"
        );

        let mut next_tick = Instant::now();
        let mut follow_up = false;
        loop {
            if self.is_disabled().await {
                break;
            }

            if follow_up {
                debug!(account = %self.config.name, "Refreshing for requests made during the last refresh");
            } else {
                tokio::select! {
                    biased;
                    cmd = self.command_rx.recv() => match cmd {
                        Some(CoordinatorCommand::Refresh) => {
                            debug!(account = %self.config.name, "Refresh requested");
                        }
                        Some(CoordinatorCommand::Stop) | None => break,
                    },
                    _ = tokio::time::sleep_until(next_tick) => {
                        debug!(account = %self.config.name, "Scheduled refresh");
                    }
                }
            }

            self.refresh().await;

            let drained = drain_commands(&mut self.command_rx);
            if drained.stop {
                break;
            }
            follow_up = drained.refresh_requested;
            next_tick = next_deadline(next_tick, period, Instant::now());
        }

        self.status.write().await.phase = CoordinatorPhase::Disabled;
        info!(account = %self.config.name, "Coordinator stopped");
    }

    async fn is_disabled(&self) -> bool {
        self.status.read().await.phase == CoordinatorPhase::Disabled
    }
}

/// Commands that queued up while a refresh was in flight.
#[derive(Debug, Default, PartialEq, Eq)]
struct Drained {
    stop: bool,
    refresh_requested: bool,
}

/// Empties the command queue. Any number of refresh requests collapse into
/// one follow-up refresh.
fn drain_commands(command_rx: &mut mpsc::Receiver<CoordinatorCommand>) -> Drained {
    let mut coalesced = 0usize;
    let stop = loop {
        match command_rx.try_recv() {
            Ok(CoordinatorCommand::Refresh) => coalesced += 1,
            Ok(CoordinatorCommand::Stop) => break true,
            Err(TryRecvError::Empty) => break false,
            // Handled by the next `recv`.
            Err(TryRecvError::Disconnected) => break false,
        }
    };
    if coalesced > 0 {
        debug!(coalesced, "Coalesced refresh requests into one follow-up refresh");
    }
    Drained {
        stop,
        refresh_requested: coalesced > 0,
    }
}

/// Next tick on the fixed schedule strictly after `now`.
fn next_deadline(mut next: Instant, period: Duration, now: Instant) -> Instant {
    while next <= now {
        next += period;
    }
    next
}

/// Consumer-side handle to a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    command_tx: mpsc::Sender<CoordinatorCommand>,
    snapshots: SnapshotReader,
    events: broadcast::Sender<ChangeEvent>,
    status: SharedStatus,
}

impl CoordinatorHandle {
    /// Returns the latest snapshot state. Never waits for a refresh.
    pub fn current_snapshot(&self) -> SnapshotState {
        self.snapshots.current()
    }

    /// Returns what a consumer can show right now.
    pub async fn availability(&self) -> Availability {
        if let SnapshotState::Ready(snapshot) = self.snapshots.current() {
            return Availability::Ready(snapshot);
        }
        match &self.status.read().await.last_error {
            Some(failure) => Availability::FirstRefreshFailed(failure.clone()),
            None => Availability::NoDataYet,
        }
    }

    /// Asks for a refresh outside the schedule.
    ///
    /// Returns immediately. Requests made while a refresh is in flight
    /// collapse into one more refresh right after it.
    pub fn request_refresh(&self) -> ServerResult<()> {
        match self.command_tx.try_send(CoordinatorCommand::Refresh) {
            Ok(()) => Ok(()),
            // Refreshes are already queued; they collapse into one.
            Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(ServerError::NotRunning),
        }
    }

    /// Subscribes to change events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Returns a receiver notified after every snapshot swap.
    pub fn watch_snapshot(&self) -> watch::Receiver<SnapshotState> {
        self.snapshots.watch()
    }

    /// Returns a copy of the current status.
    pub async fn status(&self) -> CoordinatorStatus {
        self.status.read().await.clone()
    }

    /// Tears the coordinator down.
    ///
    /// The coordinator is `Disabled` when this returns. A fetch already in
    /// flight may complete, but its result is discarded.
    pub async fn shutdown(&self) {
        self.status.write().await.phase = CoordinatorPhase::Disabled;
        // A full queue or a finished loop both see `Disabled` on their own.
        let _ = self.command_tx.try_send(CoordinatorCommand::Stop);
    }
}
