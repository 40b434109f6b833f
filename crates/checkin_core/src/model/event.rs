//! Persisted records for events, attendees and check-ins.
//!
//! All records are immutable once written. Timestamps are assigned by the
//! store (`CURRENT_TIMESTAMP`, UTC, `YYYY-MM-DD HH:MM:SS`).

use serde::{Deserialize, Serialize};

/// Store-assigned row identifier.
pub type RecordId = i64;

/// A named, dated gathering identified by a unique code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    /// Trimmed, uppercase. Unique across all events.
    pub event_code: String,
    pub name: String,
    /// Free-form date string as supplied by the organizer.
    pub event_date: String,
}

/// A person registered for exactly one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: RecordId,
    pub event_id: RecordId,
    /// Trimmed, lowercase. Unique within `event_id`.
    pub email: String,
    pub name: String,
    pub created_at: String,
}

/// One-time attendance record linking an attendee to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: RecordId,
    pub event_id: RecordId,
    pub attendee_id: RecordId,
    pub checked_in_at: String,
}

/// Row of the attendance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedInAttendee {
    pub email: String,
    pub name: String,
    pub checked_in_at: String,
}

/// Attendance summary for one event.
///
/// `total_checked_in` never exceeds `total_registered` because every check-in
/// references a registered attendee of the same event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub event_name: String,
    pub event_date: String,
    pub total_registered: u64,
    pub total_checked_in: u64,
    /// Sorted by email ascending.
    pub checked_in_attendees: Vec<CheckedInAttendee>,
}
