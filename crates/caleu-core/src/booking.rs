//! Booking types.
//!
//! [`BookingRecord`] is the canonical representation of one booking after
//! normalization. Everything downstream of the fetcher (snapshots, change
//! events, derived views) works on this type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// The host accepted the booking.
    Accepted,
    /// The booking is waiting for the host to confirm it.
    Pending,
    /// The booking was cancelled.
    Cancelled,
    /// The host rejected the booking.
    Rejected,
}

impl BookingStatus {
    /// Returns the lowercase wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true if the booking still needs a decision from the host.
    pub fn is_unconfirmed(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    /// Parses a status case-insensitively. The API sends uppercase values
    /// (`ACCEPTED`, `PENDING`); a few spelling variants are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accepted" | "confirmed" => Ok(Self::Accepted),
            "pending" | "unconfirmed" => Ok(Self::Pending),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A person attending a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Display name, if the provider sent one.
    pub name: Option<String>,
    /// Email address, if the provider sent one.
    pub email: Option<String>,
}

impl Attendee {
    /// Creates an attendee with both name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Returns the name, falling back to the email, then to `"Unknown"`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unknown")
    }
}

/// A normalized booking.
///
/// `uid` is the stable identity: it never changes for the lifetime of a
/// booking and is unique within one snapshot. `start <= end` always holds
/// for records produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Provider-assigned identifier.
    pub id: String,
    /// Stable provider-assigned identity.
    pub uid: String,
    /// Booking title.
    pub title: String,
    /// When the booking starts.
    pub start: DateTime<Utc>,
    /// When the booking ends.
    pub end: DateTime<Utc>,
    /// Current status.
    pub status: BookingStatus,
    /// Attendees in provider order.
    pub attendees: Vec<Attendee>,
    /// Free-form location.
    pub location: Option<String>,
    /// Video meeting URL.
    pub meeting_url: Option<String>,
}

impl BookingRecord {
    /// Creates a booking with the required fields.
    pub fn new(
        id: impl Into<String>,
        uid: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            title: title.into(),
            start,
            end,
            status,
            attendees: Vec::new(),
            location: None,
            meeting_url: None,
        }
    }

    /// Builder: set attendees.
    pub fn with_attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.attendees = attendees;
        self
    }

    /// Builder: set location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set meeting URL.
    pub fn with_meeting_url(mut self, url: impl Into<String>) -> Self {
        self.meeting_url = Some(url.into());
        self
    }

    /// Returns true if the booking starts strictly after `now`.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// Returns true if the booking has not ended at `now`.
    pub fn is_active_or_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end > now
    }

    /// Returns true if the booking overlaps the closed range `[start, end]`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.end >= start && self.start <= end
    }

    /// Returns the duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("ACCEPTED".parse::<BookingStatus>(), Ok(BookingStatus::Accepted));
        assert_eq!("pending".parse::<BookingStatus>(), Ok(BookingStatus::Pending));
        assert_eq!("Canceled".parse::<BookingStatus>(), Ok(BookingStatus::Cancelled));
        assert_eq!("rejected".parse::<BookingStatus>(), Ok(BookingStatus::Rejected));
        assert_eq!("confirmed".parse::<BookingStatus>(), Ok(BookingStatus::Accepted));
    }

    #[test]
    fn status_rejects_unknown_values() {
        let err = "tentative".parse::<BookingStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("tentative".to_string()));
        assert!(err.to_string().contains("tentative"));
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&BookingStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert!(BookingStatus::Pending.is_unconfirmed());
        assert!(!BookingStatus::Accepted.is_unconfirmed());
    }

    #[test]
    fn attendee_display_name_fallbacks() {
        let full = Attendee::new("Ada", "ada@example.com");
        assert_eq!(full.display_name(), "Ada");

        let email_only = Attendee {
            name: None,
            email: Some("bob@example.com".to_string()),
        };
        assert_eq!(email_only.display_name(), "bob@example.com");

        let empty = Attendee {
            name: None,
            email: None,
        };
        assert_eq!(empty.display_name(), "Unknown");
    }

    #[test]
    fn record_time_predicates() {
        let record = BookingRecord::new(
            "1",
            "uid-1",
            "Intro call",
            utc(10, 0),
            utc(10, 30),
            BookingStatus::Accepted,
        );

        assert!(record.starts_after(utc(9, 59)));
        assert!(!record.starts_after(utc(10, 0)));
        assert!(record.is_active_or_upcoming(utc(10, 15)));
        assert!(!record.is_active_or_upcoming(utc(10, 30)));
        assert_eq!(record.duration_minutes(), 30);
    }

    #[test]
    fn record_overlap_is_inclusive() {
        let record = BookingRecord::new(
            "1",
            "uid-1",
            "Intro call",
            utc(10, 0),
            utc(11, 0),
            BookingStatus::Accepted,
        );

        assert!(record.overlaps(utc(11, 0), utc(12, 0)));
        assert!(record.overlaps(utc(9, 0), utc(10, 0)));
        assert!(record.overlaps(utc(10, 15), utc(10, 45)));
        assert!(!record.overlaps(utc(11, 0) + Duration::seconds(1), utc(12, 0)));
    }

    #[test]
    fn record_builders() {
        let record = BookingRecord::new(
            "7",
            "uid-7",
            "Demo",
            utc(10, 0),
            utc(11, 0),
            BookingStatus::Pending,
        )
        .with_attendees(vec![Attendee::new("Ada", "ada@example.com")])
        .with_location("Office")
        .with_meeting_url("https://cal.eu/video/abc");

        assert_eq!(record.attendees.len(), 1);
        assert_eq!(record.location.as_deref(), Some("Office"));
        assert_eq!(record.meeting_url.as_deref(), Some("https://cal.eu/video/abc"));
    }
}
