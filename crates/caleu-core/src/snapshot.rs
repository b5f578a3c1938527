//! Published booking snapshots and the views derived from them.
//!
//! A [`Snapshot`] is the complete set of bookings accepted at the end of one
//! successful refresh. It is immutable once built; consumers share it behind
//! an `Arc`. All derived views (counts, next booking, filtered lists) are
//! computed on demand from the snapshot and an explicit `now`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::booking::{BookingRecord, BookingStatus};
use crate::schedule::Schedule;

/// The bookings accepted by one successful refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    records: Vec<BookingRecord>,
    schedules: Vec<Schedule>,
    fetched_at: DateTime<Utc>,
    #[serde(skip)]
    known_uids: HashSet<String>,
}

impl Snapshot {
    /// Builds a snapshot, indexing the uids of `records`.
    ///
    /// Callers are expected to pass records with unique uids; normalization
    /// guarantees this.
    pub fn new(
        records: Vec<BookingRecord>,
        schedules: Vec<Schedule>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let known_uids = records.iter().map(|r| r.uid.clone()).collect();
        Self {
            records,
            schedules,
            fetched_at,
            known_uids,
        }
    }

    /// Records in provider order.
    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    /// Schedules fetched in the same cycle.
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// When the refresh that produced this snapshot completed.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// The identity set of this snapshot.
    pub fn known_uids(&self) -> &HashSet<String> {
        &self.known_uids
    }

    /// Returns true if a booking with `uid` is present.
    pub fn contains(&self, uid: &str) -> bool {
        self.known_uids.contains(uid)
    }

    /// Looks up a booking by uid.
    pub fn get(&self, uid: &str) -> Option<&BookingRecord> {
        self.records.iter().find(|r| r.uid == uid)
    }

    /// Total number of bookings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no bookings.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of bookings with the given status.
    pub fn count_by_status(&self, status: BookingStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Bookings with the given status, in provider order.
    pub fn with_status(&self, status: BookingStatus) -> Vec<&BookingRecord> {
        self.filter(|r| r.status == status)
    }

    /// Bookings waiting for the host to confirm them.
    pub fn unconfirmed(&self) -> Vec<&BookingRecord> {
        self.filter(|r| r.status.is_unconfirmed())
    }

    /// Bookings matching an arbitrary predicate, in provider order.
    pub fn filter<P>(&self, predicate: P) -> Vec<&BookingRecord>
    where
        P: Fn(&BookingRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// The earliest booking starting strictly after `now`.
    ///
    /// Ties on `start` are broken by `uid` ascending.
    pub fn next_booking(&self, now: DateTime<Utc>) -> Option<&BookingRecord> {
        self.records
            .iter()
            .filter(|r| r.starts_after(now))
            .min_by(|a, b| (a.start, &a.uid).cmp(&(b.start, &b.uid)))
    }

    /// The earliest-starting booking that has not ended at `now`.
    ///
    /// This is the booking a calendar shows as "current": an ongoing booking
    /// wins over later ones.
    pub fn active_or_next(&self, now: DateTime<Utc>) -> Option<&BookingRecord> {
        self.records
            .iter()
            .filter(|r| r.is_active_or_upcoming(now))
            .min_by(|a, b| (a.start, &a.uid).cmp(&(b.start, &b.uid)))
    }

    /// Bookings overlapping `[start, end]`, sorted by start time.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&BookingRecord> {
        let mut records = self.filter(|r| r.overlaps(start, end));
        records.sort_by(|a, b| (a.start, &a.uid).cmp(&(b.start, &b.uid)));
        records
    }

    /// Bookings whose uid is absent from `previous`, in provider order.
    pub fn added_since(&self, previous: &HashSet<String>) -> Vec<&BookingRecord> {
        self.filter(|r| !previous.contains(&r.uid))
    }
}

/// What the store currently holds.
#[derive(Debug, Clone, Default)]
pub enum SnapshotState {
    /// No refresh has succeeded yet.
    #[default]
    Uninitialized,
    /// The most recent successful snapshot.
    Ready(Arc<Snapshot>),
}

impl SnapshotState {
    /// Returns true once a snapshot has been published.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the snapshot, if any.
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            Self::Uninitialized => None,
        }
    }

    /// Returns a copy of the published identity set, empty before the first
    /// refresh.
    pub fn known_uids(&self) -> HashSet<String> {
        self.snapshot()
            .map(|s| s.known_uids().clone())
            .unwrap_or_default()
    }
}
