//! Change events emitted after a refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::{Attendee, BookingRecord, BookingStatus};

/// Wire name of the new-booking event.
pub const NEW_BOOKING_EVENT: &str = "cal_eu_new_booking";

/// A discrete change detected between two refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum ChangeEvent {
    /// A booking whose uid was absent from the previous snapshot.
    #[serde(rename = "cal_eu_new_booking")]
    NewBooking(NewBooking),
}

impl ChangeEvent {
    /// Returns the wire name of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewBooking(_) => NEW_BOOKING_EVENT,
        }
    }

    /// Returns the uid of the booking this event is about.
    pub fn uid(&self) -> &str {
        match self {
            Self::NewBooking(b) => &b.uid,
        }
    }
}

/// Payload of a [`ChangeEvent::NewBooking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub uid: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub attendees: Vec<Attendee>,
    pub location: Option<String>,
}

impl From<&BookingRecord> for NewBooking {
    fn from(record: &BookingRecord) -> Self {
        Self {
            uid: record.uid.clone(),
            title: record.title.clone(),
            start: record.start,
            end: record.end,
            status: record.status,
            attendees: record.attendees.clone(),
            location: record.location.clone(),
        }
    }
}

impl From<&BookingRecord> for ChangeEvent {
    fn from(record: &BookingRecord) -> Self {
        Self::NewBooking(NewBooking::from(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> BookingRecord {
        BookingRecord::new(
            "42",
            "uid-42",
            "Discovery call",
            Utc.with_ymd_and_hms(2025, 3, 10, 13, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 13, 30, 0).unwrap(),
            BookingStatus::Pending,
        )
        .with_attendees(vec![Attendee::new("Ada", "ada@example.com")])
        .with_meeting_url("https://cal.eu/video/xyz")
    }

    #[test]
    fn event_from_record() {
        let event = ChangeEvent::from(&record());
        assert_eq!(event.kind(), NEW_BOOKING_EVENT);
        assert_eq!(event.uid(), "uid-42");

        let ChangeEvent::NewBooking(payload) = event;
        assert_eq!(payload.title, "Discovery call");
        assert_eq!(payload.attendees.len(), 1);
        assert!(payload.location.is_none());
    }

    #[test]
    fn event_wire_shape() {
        let event = ChangeEvent::from(&record());
        insta::assert_json_snapshot!(event, @r###"
        {
          "event_type": "cal_eu_new_booking",
          "uid": "uid-42",
          "title": "Discovery call",
          "start": "2025-03-10T13:00:00Z",
          "end": "2025-03-10T13:30:00Z",
          "status": "pending",
          "attendees": [
            {
              "name": "Ada",
              "email": "ada@example.com"
            }
          ],
          "location": null
        }
        "###);
    }

    #[test]
    fn event_deserializes_from_wire() {
        let event = ChangeEvent::from(&record());
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
