//! Raw booking records as the API sends them.
//!
//! Every field is optional here: deciding which fields are required is the
//! job of [`crate::normalize`]. Records are kept as JSON values until
//! normalization so that a single record with an unexpected shape cannot
//! fail the whole response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider identifier: the API sends integers, but strings are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// An attendee as sent by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A booking as sent by the API.
///
/// Newer API versions use `start`/`end`, older ones `startTime`/`endTime`;
/// both are accepted and `start`/`end` win when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBooking {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<RawAttendee>>,
    /// Usually a string; other shapes are ignored.
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub meeting_url: Option<String>,
}

impl RawBooking {
    /// Decodes one record from the response body.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Effective start timestamp string.
    pub fn start_str(&self) -> Option<&str> {
        non_empty(self.start.as_deref()).or(non_empty(self.start_time.as_deref()))
    }

    /// Effective end timestamp string.
    pub fn end_str(&self) -> Option<&str> {
        non_empty(self.end.as_deref()).or(non_empty(self.end_time.as_deref()))
    }

    /// Location, if it was sent as a non-empty string.
    pub fn location_str(&self) -> Option<&str> {
        non_empty(self.location.as_ref().and_then(Value::as_str))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_api_record() {
        let raw = RawBooking::from_value(json!({
            "id": 1024,
            "uid": "bk_8f2",
            "title": "30 min meeting",
            "start": "2025-03-11T09:00:00.000Z",
            "end": "2025-03-11T09:30:00.000Z",
            "status": "ACCEPTED",
            "attendees": [{"name": "Ada", "email": "ada@example.com", "timeZone": "Europe/Paris"}],
            "location": "integrations:daily",
            "meetingUrl": "https://app.cal.eu/video/bk_8f2",
            "eventTypeId": 7
        }))
        .unwrap();

        assert_eq!(raw.id, Some(RawId::Number(1024)));
        assert_eq!(raw.uid.as_deref(), Some("bk_8f2"));
        assert_eq!(raw.start_str(), Some("2025-03-11T09:00:00.000Z"));
        assert_eq!(raw.location_str(), Some("integrations:daily"));
        assert_eq!(raw.meeting_url.as_deref(), Some("https://app.cal.eu/video/bk_8f2"));
        assert_eq!(raw.attendees.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn legacy_time_fields_are_used_as_fallback() {
        let raw = RawBooking::from_value(json!({
            "uid": "x",
            "startTime": "2025-03-11T09:00:00Z",
            "endTime": "2025-03-11T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(raw.start_str(), Some("2025-03-11T09:00:00Z"));
        assert_eq!(raw.end_str(), Some("2025-03-11T10:00:00Z"));
    }

    #[test]
    fn non_string_location_is_ignored() {
        let raw = RawBooking::from_value(json!({
            "uid": "x",
            "location": {"type": "address", "address": "Main St"}
        }))
        .unwrap();

        assert!(raw.location_str().is_none());
    }

    #[test]
    fn null_attendees_are_accepted() {
        let raw = RawBooking::from_value(json!({"uid": "x", "attendees": null})).unwrap();
        assert!(raw.attendees.is_none());
    }

    #[test]
    fn string_ids_display_verbatim() {
        assert_eq!(RawId::Text("abc".into()).to_string(), "abc");
        assert_eq!(RawId::Number(7).to_string(), "7");
    }

    #[test]
    fn non_object_record_fails_to_decode() {
        assert!(RawBooking::from_value(json!("not a booking")).is_err());
    }
}
