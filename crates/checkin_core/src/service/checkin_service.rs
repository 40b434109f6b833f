//! Event check-in use-case service.
//!
//! # Responsibility
//! - Create events, register attendees, record check-ins, build reports.
//! - Enforce the `unregistered -> registered -> checked_in` lifecycle.
//!
//! # Invariants
//! - Validation runs before any repository access.
//! - Event codes are matched uppercase, emails lowercase, both trimmed.
//! - Existence checks are advisory; store unique constraints are mapped to
//!   the same conflict errors when a concurrent writer wins the race.
//! - Logs carry event codes and row ids only, never emails or names.

use crate::model::event::{AttendanceReport, Attendee, CheckIn, Event};
use crate::model::request::{
    normalize_email, normalize_event_code, validate_email, validate_event_code,
    CreateEventRequest, RegisterAttendeeRequest, ValidationError,
};
use crate::repo::event_repo::{EventRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; nothing was read or written.
    Validation,
    /// Unknown event or unregistered attendee.
    NotFound,
    /// Duplicate event code, registration or check-in.
    Conflict,
    /// Persistence-layer failure.
    Storage,
}

/// Errors from check-in service operations.
#[derive(Debug)]
pub enum CheckinServiceError {
    Validation(ValidationError),
    /// No event matches the normalized code.
    EventNotFound { event_code: String },
    /// Email is not registered for the event.
    AttendeeNotRegistered { event_code: String },
    /// Another event already uses the normalized code.
    DuplicateEventCode { event_code: String },
    /// Email is already registered for the event.
    DuplicateRegistration { event_code: String },
    /// Attendee already has a check-in for the event.
    AlreadyCheckedIn { event_code: String },
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl CheckinServiceError {
    /// Returns the error category callers should branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::EventNotFound { .. } | Self::AttendeeNotRegistered { .. } => ErrorKind::NotFound,
            Self::DuplicateEventCode { .. }
            | Self::DuplicateRegistration { .. }
            | Self::AlreadyCheckedIn { .. } => ErrorKind::Conflict,
            Self::Repo(_) | Self::InconsistentState(_) => ErrorKind::Storage,
        }
    }
}

impl Display for CheckinServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EventNotFound { .. } => write!(f, "event not found"),
            Self::AttendeeNotRegistered { .. } => write!(f, "attendee not registered"),
            Self::DuplicateEventCode { .. } => write!(f, "duplicate event code"),
            Self::DuplicateRegistration { .. } => write!(f, "duplicate registration"),
            Self::AlreadyCheckedIn { .. } => write!(f, "attendee already checked in"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for CheckinServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CheckinServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CheckinServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, CheckinServiceError>;

/// Check-in service facade over repository implementations.
pub struct CheckinService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> CheckinService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one event from a validated request.
    ///
    /// # Contract
    /// - Code is stored trimmed uppercase; name and date trimmed.
    /// - An existing code fails with `DuplicateEventCode`.
    pub fn create_event(&self, request: &CreateEventRequest) -> ServiceResult<Event> {
        request.validate()?;

        let event_code = normalize_event_code(&request.event_code);
        let created = self
            .repo
            .insert_event(&event_code, request.name.trim(), request.event_date.trim())
            .map_err(|err| match err {
                RepoError::UniqueViolation { .. } => CheckinServiceError::DuplicateEventCode {
                    event_code: event_code.clone(),
                },
                other => other.into(),
            });

        match created {
            Ok(event) => {
                info!(
                    "event=event_create module=service status=ok event_code={} event_id={}",
                    event.event_code, event.id
                );
                Ok(event)
            }
            Err(err) => {
                warn!(
                    "event=event_create module=service status=error event_code={event_code} error={err}"
                );
                Err(err)
            }
        }
    }

    /// Registers one attendee for the event identified by `event_code`.
    ///
    /// # Contract
    /// - Email is stored trimmed lowercase; name trimmed.
    /// - Fails `EventNotFound` for unknown codes.
    /// - Fails `DuplicateRegistration` when the email is already registered.
    pub fn register_attendee(
        &self,
        event_code: &str,
        request: &RegisterAttendeeRequest,
    ) -> ServiceResult<Attendee> {
        validate_event_code(event_code)?;
        request.validate()?;

        let event = self.resolve_event(event_code)?;
        let email = normalize_email(&request.email);
        let duplicate = || CheckinServiceError::DuplicateRegistration {
            event_code: event.event_code.clone(),
        };

        if self.repo.find_attendee_by_email(event.id, &email)?.is_some() {
            warn!(
                "event=attendee_register module=service status=conflict event_code={}",
                event.event_code
            );
            return Err(duplicate());
        }

        let attendee_id = self
            .repo
            .insert_attendee(event.id, &email, request.name.trim())
            .map_err(|err| match err {
                RepoError::UniqueViolation { .. } => duplicate(),
                other => other.into(),
            })?;
        info!(
            "event=attendee_register module=service status=ok event_code={} attendee_id={attendee_id}",
            event.event_code
        );

        self.repo
            .get_attendee(attendee_id)?
            .ok_or(CheckinServiceError::InconsistentState(
                "registered attendee not found in read-back",
            ))
    }

    /// Records the single check-in for a registered attendee.
    ///
    /// # Contract
    /// - Fails `EventNotFound` / `AttendeeNotRegistered` for unknown targets.
    /// - Fails `AlreadyCheckedIn` on the second attempt for the same pair.
    /// - Timestamp is assigned by the store.
    pub fn check_in_attendee(&self, event_code: &str, email: &str) -> ServiceResult<CheckIn> {
        validate_event_code(event_code)?;
        validate_email(email)?;

        let event = self.resolve_event(event_code)?;
        let attendee = self
            .repo
            .find_attendee_by_email(event.id, &normalize_email(email))?
            .ok_or_else(|| CheckinServiceError::AttendeeNotRegistered {
                event_code: event.event_code.clone(),
            })?;
        let already = || CheckinServiceError::AlreadyCheckedIn {
            event_code: event.event_code.clone(),
        };

        if self.repo.is_checked_in(event.id, attendee.id)? {
            warn!(
                "event=attendee_checkin module=service status=conflict event_code={} attendee_id={}",
                event.event_code, attendee.id
            );
            return Err(already());
        }

        let checkin_id = self
            .repo
            .insert_checkin(event.id, attendee.id)
            .map_err(|err| match err {
                RepoError::UniqueViolation { .. } => already(),
                other => other.into(),
            })?;
        info!(
            "event=attendee_checkin module=service status=ok event_code={} attendee_id={} checkin_id={checkin_id}",
            event.event_code, attendee.id
        );

        self.repo
            .get_checkin(checkin_id)?
            .ok_or(CheckinServiceError::InconsistentState(
                "recorded check-in not found in read-back",
            ))
    }

    /// Builds the attendance report for one event.
    pub fn get_attendance_report(&self, event_code: &str) -> ServiceResult<AttendanceReport> {
        validate_event_code(event_code)?;

        let event = self.resolve_event(event_code)?;
        let total_registered = self.repo.count_registered(event.id)?;
        let total_checked_in = self.repo.count_checked_in(event.id)?;
        let checked_in_attendees = self.repo.list_checked_in_attendees(event.id)?;
        info!(
            "event=attendance_report module=service status=ok event_code={} registered={total_registered} checked_in={total_checked_in}",
            event.event_code
        );

        Ok(AttendanceReport {
            event_name: event.name,
            event_date: event.event_date,
            total_registered,
            total_checked_in,
            checked_in_attendees,
        })
    }

    /// Looks up one event by any case/whitespace variant of its code.
    pub fn find_event(&self, event_code: &str) -> ServiceResult<Option<Event>> {
        validate_event_code(event_code)?;
        Ok(self
            .repo
            .find_event_by_code(&normalize_event_code(event_code))?)
    }

    fn resolve_event(&self, event_code: &str) -> ServiceResult<Event> {
        let normalized = normalize_event_code(event_code);
        match self.repo.find_event_by_code(&normalized)? {
            Some(event) => Ok(event),
            None => {
                warn!("event=event_lookup module=service status=not_found event_code={normalized}");
                Err(CheckinServiceError::EventNotFound {
                    event_code: normalized,
                })
            }
        }
    }
}
