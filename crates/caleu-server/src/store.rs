//! Snapshot store.
//!
//! The store holds the most recently accepted [`Snapshot`] behind a
//! `tokio::sync::watch` channel. The coordinator owns the [`SnapshotStore`]
//! (the only write side); consumers get [`SnapshotReader`]s. Replacing the
//! snapshot swaps one `Arc`, so a reader sees either the old or the new
//! snapshot in full.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use caleu_core::{BookingRecord, Schedule, Snapshot, SnapshotState};

/// Write side of the snapshot store.
#[derive(Debug)]
pub struct SnapshotStore {
    tx: watch::Sender<SnapshotState>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an uninitialized store.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SnapshotState::Uninitialized);
        Self { tx }
    }

    /// Returns what the store currently holds.
    pub fn current(&self) -> SnapshotState {
        self.tx.borrow().clone()
    }

    /// Swaps in a new snapshot and returns it together with the previous
    /// snapshot's uid set (empty if the store was uninitialized).
    pub fn replace(
        &self,
        records: Vec<BookingRecord>,
        schedules: Vec<Schedule>,
        fetched_at: DateTime<Utc>,
    ) -> (Arc<Snapshot>, HashSet<String>) {
        let snapshot = Arc::new(Snapshot::new(records, schedules, fetched_at));
        let previous = self.tx.send_replace(SnapshotState::Ready(Arc::clone(&snapshot)));
        (snapshot, previous.known_uids())
    }

    /// Returns a receiver notified after every swap.
    pub fn watch(&self) -> watch::Receiver<SnapshotState> {
        self.tx.subscribe()
    }

    /// Returns a read-only handle.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader { rx: self.watch() }
    }
}

/// Read side of the snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<SnapshotState>,
}

impl SnapshotReader {
    /// Returns the latest snapshot state without waiting for a refresh.
    pub fn current(&self) -> SnapshotState {
        self.rx.borrow().clone()
    }

    /// Returns a receiver notified after every swap.
    pub fn watch(&self) -> watch::Receiver<SnapshotState> {
        self.rx.clone()
    }
}
