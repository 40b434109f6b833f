//! Command-line entry point for the event check-in tracker.
//!
//! # Responsibility
//! - Parse arguments and settings, then dispatch to `CheckinService`.
//! - Print results as pretty JSON and map failures to a non-zero exit.

use checkin_core::db::open_db;
use checkin_core::{
    default_log_level, init_logging, CheckinService, CreateEventRequest,
    RegisterAttendeeRequest, ServiceResult, SqliteEventRepository,
};
use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "checkin")]
#[command(version, about = "Create events, register attendees and record check-ins")]
struct Cli {
    /// SQLite database file (created on first use)
    #[arg(long, env = "CHECKIN_DB", default_value = "events.db", global = true)]
    db: PathBuf,
    /// Log level: trace|debug|info|warn|error (needs --log-dir)
    #[arg(long, env = "CHECKIN_LOG_LEVEL", global = true, requires = "log_dir")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "CHECKIN_LOG_DIR", global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new event
    CreateEvent {
        /// Unique event code (case-insensitive)
        event_code: String,
        /// Display name
        name: String,
        /// Event date, e.g. 2026-03-10
        event_date: String,
    },
    /// Register an attendee for an event
    Register {
        event_code: String,
        email: String,
        name: String,
    },
    /// Check in a registered attendee
    #[command(name = "checkin")]
    CheckIn { event_code: String, email: String },
    /// Show the attendance report of an event
    Report { event_code: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let service = CheckinService::new(SqliteEventRepository::try_new(&conn)?);

    let rendered = match cli.command {
        Commands::CreateEvent {
            event_code,
            name,
            event_date,
        } => render(
            service.create_event(&CreateEventRequest::new(event_code, name, event_date)),
        )?,
        Commands::Register {
            event_code,
            email,
            name,
        } => render(
            service.register_attendee(&event_code, &RegisterAttendeeRequest::new(email, name)),
        )?,
        Commands::CheckIn { event_code, email } => {
            render(service.check_in_attendee(&event_code, &email))?
        }
        Commands::Report { event_code } => render(service.get_attendance_report(&event_code))?,
    };

    println!("{rendered}");
    Ok(())
}

fn render<T: Serialize>(result: ServiceResult<T>) -> Result<String, Box<dyn Error>> {
    match result {
        Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
        Err(err) => {
            error!(
                "event=command_failed module=cli status=error kind={:?} error={err}",
                err.kind()
            );
            Err(err.into())
        }
    }
}
