//! Core use-case services.
//!
//! # Responsibility
//! - Validate and normalize caller input, then orchestrate repository calls.
//! - Keep the command surface decoupled from storage details.

pub mod checkin_service;
