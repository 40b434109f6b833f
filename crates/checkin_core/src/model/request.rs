//! Typed boundary inputs and field-level validation.
//!
//! # Responsibility
//! - Reject blank or malformed fields before the repository is touched.
//! - Produce normalized values used for both lookup and storage.
//!
//! # Invariants
//! - Fields are validated in declaration order; the first failure wins.
//! - Normalization never changes whether a value is valid.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is missing or whitespace only.
    Blank { field: &'static str },
    /// Field is not a syntactically valid email address.
    InvalidEmail { field: &'static str },
}

impl ValidationError {
    /// Returns the offending field name.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::InvalidEmail { field } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} must be a non-empty string"),
            Self::InvalidEmail { field } => write!(f, "{field} must be a valid email"),
        }
    }
}

impl Error for ValidationError {}

/// Input for creating an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub event_code: String,
    pub name: String,
    pub event_date: String,
}

impl CreateEventRequest {
    pub fn new(
        event_code: impl Into<String>,
        name: impl Into<String>,
        event_date: impl Into<String>,
    ) -> Self {
        Self {
            event_code: event_code.into(),
            name: name.into(),
            event_date: event_date.into(),
        }
    }

    /// Checks that code, name and date are all non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("event.event_code", &self.event_code)?;
        require_non_blank("event.name", &self.name)?;
        require_non_blank("event.event_date", &self.event_date)?;
        Ok(())
    }
}

/// Input for registering an attendee against an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAttendeeRequest {
    pub email: String,
    pub name: String,
}

impl RegisterAttendeeRequest {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    /// Checks for a non-blank name and a well-formed email.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("attendee.name", &self.name)?;
        validate_email_field("attendee.email", &self.email)
    }
}

/// Validates a bare event code argument.
pub fn validate_event_code(event_code: &str) -> Result<(), ValidationError> {
    require_non_blank("event_code", event_code)
}

/// Validates a bare email argument.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    validate_email_field("email", email)
}

/// Returns whether `email` is a syntactically valid address after trimming.
///
/// Accepts `local@domain.tld` where the TLD has at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    !trimmed.is_empty() && EMAIL_RE.is_match(trimmed)
}

/// Trims and uppercases an event code.
pub fn normalize_event_code(event_code: &str) -> String {
    event_code.trim().to_uppercase()
}

/// Trims and lowercases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

fn validate_email_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_non_blank(field, value)?;
    if !is_valid_email(value) {
        return Err(ValidationError::InvalidEmail { field });
    }
    Ok(())
}
