//! Booking sources and normalization.
//!
//! - [`BookingFetcher`] - the trait a booking source implements
//! - [`RawBooking`] - a booking record as the API sends it
//! - [`normalize_bookings`] - raw records to [`caleu_core::BookingRecord`]s
//! - [`ProviderError`] - classified fetch failures
//!
//! ```text
//!  Cal.eu API ──► CalEuFetcher ──► Vec<Value> ──► normalize_bookings() ──► Vec<BookingRecord>
//! ```

#[cfg(feature = "caleu")]
pub mod caleu;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod raw_booking;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fetcher::{BookingFetcher, BookingQuery, BoxFuture, DEFAULT_STATUS_FILTER, FetchResult};
pub use normalize::{
    DEFAULT_TITLE, DroppedRecord, NormalizeError, Normalized, normalize_booking,
    normalize_bookings,
};
pub use raw_booking::{RawAttendee, RawBooking, RawId};
