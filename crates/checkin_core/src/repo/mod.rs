//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every statement is parameterized; no caller text is spliced into SQL.
//! - Unique-constraint failures are reported as `RepoError::UniqueViolation`
//!   so callers can tell conflicts apart from transport errors.

pub mod event_repo;
