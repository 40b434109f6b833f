//! Core domain logic for the event check-in tracker.
//! This crate is the single source of truth for registration and check-in
//! invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{
    AttendanceReport, Attendee, CheckIn, CheckedInAttendee, Event, RecordId,
};
pub use model::request::{
    is_valid_email, normalize_email, normalize_event_code, CreateEventRequest,
    RegisterAttendeeRequest, ValidationError,
};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use service::checkin_service::{
    CheckinService, CheckinServiceError, ErrorKind, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
