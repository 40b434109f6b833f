//! Domain records and boundary request types.
//!
//! # Responsibility
//! - Define the persisted shapes for events, attendees and check-ins.
//! - Validate and normalize caller input before any store access.
//!
//! # Invariants
//! - Event codes are stored trimmed and uppercase.
//! - Attendee emails are stored trimmed and lowercase.

pub mod event;
pub mod request;
