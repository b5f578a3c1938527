//! Raw record to [`BookingRecord`] conversion.
//!
//! Normalization is per record: a record that fails is dropped and reported
//! in [`Normalized::dropped`], the rest of the response is kept.
//!
//! Required fields are `uid`, `start`, `end` and `status`. A missing title
//! becomes [`DEFAULT_TITLE`]; a missing id falls back to the uid.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use caleu_core::{Attendee, BookingRecord, BookingStatus, UnknownStatus};

use crate::raw_booking::RawBooking;

/// Title used when the API sends none.
pub const DEFAULT_TITLE: &str = "Cal.eu Booking";

/// Why a single record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The record is not an object of the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid timestamp in `{field}`: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("booking ends before it starts")]
    EndBeforeStart,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    /// Another record earlier in the same response has this uid.
    #[error("duplicate uid")]
    DuplicateUid,
}

/// A record that normalization rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    /// Position in the response.
    pub index: usize,
    /// The record's uid, when it had one.
    pub uid: Option<String>,
    pub reason: NormalizeError,
}

/// Output of [`normalize_bookings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Accepted records in response order, uids unique.
    pub records: Vec<BookingRecord>,
    /// Rejected records.
    pub dropped: Vec<DroppedRecord>,
}

/// Converts one decoded record.
pub fn normalize_booking(raw: &RawBooking) -> Result<BookingRecord, NormalizeError> {
    let uid = raw
        .uid
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("uid"))?;

    let start = parse_time("start", raw.start_str())?;
    let end = parse_time("end", raw.end_str())?;
    if start > end {
        return Err(NormalizeError::EndBeforeStart);
    }

    let status: BookingStatus = raw
        .status
        .as_deref()
        .ok_or(NormalizeError::MissingField("status"))?
        .parse()?;

    let id = raw
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| uid.to_string());

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let attendees = raw
        .attendees
        .iter()
        .flatten()
        .map(|a| Attendee {
            name: a.name.clone(),
            email: a.email.clone(),
        })
        .collect();

    let mut record =
        BookingRecord::new(id, uid, title, start, end, status).with_attendees(attendees);

    if let Some(location) = raw.location_str() {
        record = record.with_location(location);
    }

    if let Some(url) = raw.meeting_url.as_deref().filter(|s| !s.is_empty()) {
        record = record.with_meeting_url(url);
    }

    Ok(record)
}

/// Normalizes a whole response, dropping records that fail individually.
///
/// Only the first record for a given uid is kept.
pub fn normalize_bookings(values: Vec<Value>) -> Normalized {
    let mut out = Normalized::default();
    let mut seen = HashSet::new();

    for (index, value) in values.into_iter().enumerate() {
        let raw = match RawBooking::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                out.drop_record(index, None, NormalizeError::Malformed(e.to_string()));
                continue;
            }
        };

        match normalize_booking(&raw) {
            Ok(record) => {
                if seen.insert(record.uid.clone()) {
                    out.records.push(record);
                } else {
                    out.drop_record(index, Some(record.uid), NormalizeError::DuplicateUid);
                }
            }
            Err(reason) => out.drop_record(index, raw.uid, reason),
        }
    }

    out
}

impl Normalized {
    fn drop_record(&mut self, index: usize, uid: Option<String>, reason: NormalizeError) {
        debug!(index, uid = ?uid, reason = %reason, "Dropping booking record");
        self.dropped.push(DroppedRecord { index, uid, reason });
    }
}

fn parse_time(field: &'static str, value: Option<&str>) -> Result<DateTime<Utc>, NormalizeError> {
    let value = value.ok_or(NormalizeError::MissingField(field))?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| NormalizeError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
