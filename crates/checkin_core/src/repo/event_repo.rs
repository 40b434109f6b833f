//! Event/attendee/check-in repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert and lookup APIs over `events`, `attendees`, `checkins`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Inputs are expected to be normalized by the service layer already.
//! - Store-level unique constraints are the authoritative duplicate guard.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::event::{Attendee, CheckIn, CheckedInAttendee, Event, RecordId};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REQUIRED_TABLES: [&str; 3] = ["events", "attendees", "checkins"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Insert rejected by a `UNIQUE` constraint on `table`.
    UniqueViolation { table: &'static str },
    /// Insert into `table` references a missing or mismatched parent row.
    ForeignKeyViolation { table: &'static str },
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueViolation { table } => {
                write!(f, "unique constraint violated on `{table}`")
            }
            Self::ForeignKeyViolation { table } => {
                write!(f, "foreign key constraint violated on `{table}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the three check-in tables.
pub trait EventRepository {
    /// Inserts one event and returns the stored row.
    fn insert_event(&self, event_code: &str, name: &str, event_date: &str) -> RepoResult<Event>;
    /// Finds an event by its exact (already normalized) code.
    fn find_event_by_code(&self, event_code: &str) -> RepoResult<Option<Event>>;
    /// Inserts one attendee and returns its generated id.
    fn insert_attendee(&self, event_id: RecordId, email: &str, name: &str)
        -> RepoResult<RecordId>;
    /// Gets one attendee by id.
    fn get_attendee(&self, attendee_id: RecordId) -> RepoResult<Option<Attendee>>;
    /// Finds an attendee by exact (already normalized) email within one event.
    fn find_attendee_by_email(
        &self,
        event_id: RecordId,
        email: &str,
    ) -> RepoResult<Option<Attendee>>;
    /// Counts attendees registered for one event.
    fn count_registered(&self, event_id: RecordId) -> RepoResult<u64>;
    /// Inserts one check-in and returns its generated id.
    ///
    /// The attendee must belong to `event_id`; otherwise the store rejects
    /// the row with `ForeignKeyViolation`.
    fn insert_checkin(&self, event_id: RecordId, attendee_id: RecordId) -> RepoResult<RecordId>;
    /// Gets one check-in by id.
    fn get_checkin(&self, checkin_id: RecordId) -> RepoResult<Option<CheckIn>>;
    /// Returns whether the attendee already has a check-in for the event.
    fn is_checked_in(&self, event_id: RecordId, attendee_id: RecordId) -> RepoResult<bool>;
    /// Counts check-ins recorded for one event.
    fn count_checked_in(&self, event_id: RecordId) -> RepoResult<u64>;
    /// Lists checked-in attendees of one event sorted by email ascending.
    fn list_checked_in_attendees(&self, event_id: RecordId)
        -> RepoResult<Vec<CheckedInAttendee>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the schema lacks a check-in table.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, event_code: &str, name: &str, event_date: &str) -> RepoResult<Event> {
        self.conn
            .execute(
                "INSERT INTO events (event_code, name, event_date) VALUES (?1, ?2, ?3);",
                params![event_code, name, event_date],
            )
            .map_err(|err| map_insert_error(err, "events"))?;

        Ok(Event {
            id: self.conn.last_insert_rowid(),
            event_code: event_code.to_string(),
            name: name.to_string(),
            event_date: event_date.to_string(),
        })
    }

    fn find_event_by_code(&self, event_code: &str) -> RepoResult<Option<Event>> {
        let event = self
            .conn
            .query_row(
                "SELECT id, event_code, name, event_date
                 FROM events
                 WHERE event_code = ?1;",
                [event_code],
                parse_event_row,
            )
            .optional()?;
        Ok(event)
    }

    fn insert_attendee(
        &self,
        event_id: RecordId,
        email: &str,
        name: &str,
    ) -> RepoResult<RecordId> {
        self.conn
            .execute(
                "INSERT INTO attendees (event_id, email, name) VALUES (?1, ?2, ?3);",
                params![event_id, email, name],
            )
            .map_err(|err| map_insert_error(err, "attendees"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_attendee(&self, attendee_id: RecordId) -> RepoResult<Option<Attendee>> {
        let attendee = self
            .conn
            .query_row(
                "SELECT id, event_id, email, name, created_at
                 FROM attendees
                 WHERE id = ?1;",
                [attendee_id],
                parse_attendee_row,
            )
            .optional()?;
        Ok(attendee)
    }

    fn find_attendee_by_email(
        &self,
        event_id: RecordId,
        email: &str,
    ) -> RepoResult<Option<Attendee>> {
        let attendee = self
            .conn
            .query_row(
                "SELECT id, event_id, email, name, created_at
                 FROM attendees
                 WHERE event_id = ?1 AND email = ?2;",
                params![event_id, email],
                parse_attendee_row,
            )
            .optional()?;
        Ok(attendee)
    }

    fn count_registered(&self, event_id: RecordId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM attendees WHERE event_id = ?1;",
            [event_id],
            |row| row.get(0),
        )?;
        to_count(count, "attendees")
    }

    fn insert_checkin(&self, event_id: RecordId, attendee_id: RecordId) -> RepoResult<RecordId> {
        self.conn
            .execute(
                "INSERT INTO checkins (event_id, attendee_id) VALUES (?1, ?2);",
                params![event_id, attendee_id],
            )
            .map_err(|err| map_insert_error(err, "checkins"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_checkin(&self, checkin_id: RecordId) -> RepoResult<Option<CheckIn>> {
        let checkin = self
            .conn
            .query_row(
                "SELECT id, event_id, attendee_id, checked_in_at
                 FROM checkins
                 WHERE id = ?1;",
                [checkin_id],
                |row| {
                    Ok(CheckIn {
                        id: row.get("id")?,
                        event_id: row.get("event_id")?,
                        attendee_id: row.get("attendee_id")?,
                        checked_in_at: row.get("checked_in_at")?,
                    })
                },
            )
            .optional()?;
        Ok(checkin)
    }

    fn is_checked_in(&self, event_id: RecordId, attendee_id: RecordId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM checkins
                WHERE event_id = ?1 AND attendee_id = ?2
            );",
            params![event_id, attendee_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_checked_in(&self, event_id: RecordId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE event_id = ?1;",
            [event_id],
            |row| row.get(0),
        )?;
        to_count(count, "checkins")
    }

    fn list_checked_in_attendees(
        &self,
        event_id: RecordId,
    ) -> RepoResult<Vec<CheckedInAttendee>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.email, a.name, c.checked_in_at
             FROM checkins c
             INNER JOIN attendees a ON a.id = c.attendee_id
             WHERE c.event_id = ?1
             ORDER BY a.email ASC;",
        )?;
        let mut rows = stmt.query([event_id])?;
        let mut attendees = Vec::new();
        while let Some(row) = rows.next()? {
            attendees.push(CheckedInAttendee {
                email: row.get("email")?,
                name: row.get("name")?,
                checked_in_at: row.get("checked_in_at")?,
            });
        }
        Ok(attendees)
    }
}

fn parse_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        event_code: row.get("event_code")?,
        name: row.get("name")?,
        event_date: row.get("event_date")?,
    })
}

fn parse_attendee_row(row: &Row<'_>) -> rusqlite::Result<Attendee> {
    Ok(Attendee {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

fn map_insert_error(err: rusqlite::Error, table: &'static str) -> RepoError {
    match constraint_code(&err) {
        Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) => RepoError::UniqueViolation { table },
        Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
            RepoError::ForeignKeyViolation { table }
        }
        _ => err.into(),
    }
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::ConstraintViolation =>
        {
            Some(inner.extended_code)
        }
        _ => None,
    }
}

fn to_count(value: i64, table: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}` in {table}")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
