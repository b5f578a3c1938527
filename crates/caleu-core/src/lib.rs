//! Core types: bookings, snapshots, change events, clock, tracing

pub mod booking;
pub mod change;
pub mod clock;
pub mod schedule;
pub mod snapshot;
pub mod tracing;

pub use booking::{Attendee, BookingRecord, BookingStatus, UnknownStatus};
pub use change::{ChangeEvent, NEW_BOOKING_EVENT, NewBooking};
pub use clock::{Clock, ManualClock, SystemClock};
pub use schedule::Schedule;
pub use snapshot::{Snapshot, SnapshotState};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
