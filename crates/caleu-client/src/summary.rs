//! Snapshot summaries printed by the CLI.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use caleu_core::{BookingRecord, ChangeEvent, Snapshot};
use caleu_server::CoordinatorStatus;

/// What `caleu fetch` reports about a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub total: usize,
    pub unconfirmed: usize,
    pub dropped: usize,
    pub schedules: usize,
    pub next: Option<NextBooking>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextBooking {
    pub uid: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub meeting_url: Option<String>,
}

impl From<&BookingRecord> for NextBooking {
    fn from(record: &BookingRecord) -> Self {
        Self {
            uid: record.uid.clone(),
            title: record.title.clone(),
            start: record.start,
            end: record.end,
            meeting_url: record.meeting_url.clone(),
        }
    }
}

impl SnapshotSummary {
    pub fn new(snapshot: &Snapshot, dropped: usize, now: DateTime<Utc>) -> Self {
        Self {
            total: snapshot.len(),
            unconfirmed: snapshot.unconfirmed().len(),
            dropped,
            schedules: snapshot.schedules().len(),
            next: snapshot.next_booking(now).map(NextBooking::from),
            fetched_at: snapshot.fetched_at(),
        }
    }

    /// Summary of the snapshot a running coordinator just published, with
    /// the drop count of the refresh that produced it.
    pub fn with_status(snapshot: &Snapshot, status: &CoordinatorStatus, now: DateTime<Utc>) -> Self {
        Self::new(snapshot, status.last_dropped, now)
    }

    /// Human-readable rendering.
    pub fn render(&self) -> String {
        let mut out = format!("{} bookings ({} unconfirmed)", self.total, self.unconfirmed);
        if self.dropped > 0 {
            out.push_str(&format!(", {} malformed records skipped", self.dropped));
        }
        match self.next {
            Some(ref next) => {
                out.push_str(&format!("\nNext: {} at {}", next.title, local_time(next.start)));
                if let Some(ref url) = next.meeting_url {
                    out.push_str(&format!("\n      {}", url));
                }
            }
            None => out.push_str("\nNo upcoming booking"),
        }
        out
    }
}

/// One line per change event.
pub fn render_event(event: &ChangeEvent) -> String {
    match event {
        ChangeEvent::NewBooking(booking) => format!(
            "New booking: {} at {} [{}] ({})",
            booking.title,
            local_time(booking.start),
            booking.status,
            booking.uid
        ),
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a %d %b %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use caleu_core::BookingStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(uid: &str, start_in_hours: i64, status: BookingStatus) -> BookingRecord {
        let start = now() + Duration::hours(start_in_hours);
        BookingRecord::new(uid, uid, format!("Call {uid}"), start, start + Duration::minutes(30), status)
    }

    #[test]
    fn summarizes_snapshot() {
        let snapshot = Snapshot::new(
            vec![
                record("past", -1, BookingStatus::Accepted),
                record("later", 3, BookingStatus::Pending),
                record("soon", 1, BookingStatus::Accepted),
            ],
            vec![],
            now(),
        );

        let summary = SnapshotSummary::new(&snapshot, 1, now());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unconfirmed, 1);
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.next.as_ref().map(|n| n.uid.as_str()), Some("soon"));

        let text = summary.render();
        assert!(text.starts_with("3 bookings (1 unconfirmed), 1 malformed records skipped"));
        assert!(text.contains("Next: Call soon at "));
    }

    #[test]
    fn running_summary_uses_last_refresh_drops() {
        let snapshot = Snapshot::new(vec![record("soon", 1, BookingStatus::Accepted)], vec![], now());
        let status = CoordinatorStatus {
            dropped_records: 7,
            last_dropped: 2,
            ..CoordinatorStatus::default()
        };

        let summary = SnapshotSummary::with_status(&snapshot, &status, now());
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn summary_without_future_bookings() {
        let snapshot = Snapshot::new(vec![record("past", -2, BookingStatus::Accepted)], vec![], now());
        let summary = SnapshotSummary::new(&snapshot, 0, now());
        assert!(summary.next.is_none());
        assert_eq!(summary.render(), "1 bookings (0 unconfirmed)\nNo upcoming booking");
    }

    #[test]
    fn summary_serializes_for_json_output() {
        let snapshot = Snapshot::new(vec![record("soon", 1, BookingStatus::Accepted)], vec![], now());
        let value = serde_json::to_value(SnapshotSummary::new(&snapshot, 0, now())).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["next"]["uid"], "soon");
        assert_eq!(value["fetched_at"], "2025-03-10T12:00:00Z");
    }

    #[test]
    fn event_line_names_booking() {
        let event = ChangeEvent::from(&record("bk_1", 1, BookingStatus::Pending));
        let line = render_event(&event);
        assert!(line.starts_with("New booking: Call bk_1 at "));
        assert!(line.ends_with("[pending] (bk_1)"));
    }
}
