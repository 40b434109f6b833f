use checkin_core::db::open_db_in_memory;
use checkin_core::{
    Attendee, CheckIn, CheckedInAttendee, CheckinService, CheckinServiceError,
    CreateEventRequest, ErrorKind, Event, EventRepository, RecordId, RegisterAttendeeRequest,
    RepoError, RepoResult, SqliteEventRepository, ValidationError,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> CheckinService<SqliteEventRepository<'_>> {
    CheckinService::new(SqliteEventRepository::try_new(conn).unwrap())
}

fn seed_event(service: &CheckinService<SqliteEventRepository<'_>>, code: &str) {
    service
        .create_event(&CreateEventRequest::new(code, "Seeded", "2026-03-10"))
        .unwrap();
}

#[test]
fn create_event_normalizes_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let event = service
        .create_event(&CreateEventRequest::new(" qa100 ", " QA Meetup ", " 2026-03-10 "))
        .unwrap();
    assert!(event.id > 0);
    assert_eq!(event.event_code, "QA100");
    assert_eq!(event.name, "QA Meetup");
    assert_eq!(event.event_date, "2026-03-10");
}

#[test]
fn any_code_variant_resolves_to_same_event() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_event(&CreateEventRequest::new("Conf-2026", "Conf", "2026-05-01"))
        .unwrap();

    for variant in ["CONF-2026", "conf-2026", "  cOnF-2026\t", "\nConf-2026 "] {
        let found = service.find_event(variant).unwrap().unwrap();
        assert_eq!(found, created, "variant {variant:?}");
    }
}

#[test]
fn create_event_rejects_blank_fields_before_store_access() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create_event(&CreateEventRequest::new("QA1", "   ", "2026-03-10"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "event.name must be a non-empty string");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn duplicate_event_code_is_a_conflict_regardless_of_case() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA1");

    let err = service
        .create_event(&CreateEventRequest::new(" qa1", "Again", "2026-03-11"))
        .unwrap_err();
    assert!(matches!(
        err,
        CheckinServiceError::DuplicateEventCode { ref event_code } if event_code == "QA1"
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn register_then_report_shows_registered_only() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create_event(&CreateEventRequest::new("QA100", "QA Meetup", "2026-03-10"))
        .unwrap();
    service
        .register_attendee(
            "QA100",
            &RegisterAttendeeRequest::new("alice@mail.com", "Alice"),
        )
        .unwrap();

    let report = service.get_attendance_report("QA100").unwrap();
    assert_eq!(report.event_name, "QA Meetup");
    assert_eq!(report.event_date, "2026-03-10");
    assert_eq!(report.total_registered, 1);
    assert_eq!(report.total_checked_in, 0);
    assert!(report.checked_in_attendees.is_empty());
}

#[test]
fn register_normalizes_email_and_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA2");

    let attendee = service
        .register_attendee(
            " qa2 ",
            &RegisterAttendeeRequest::new("  Alice@Mail.COM ", " Alice "),
        )
        .unwrap();
    assert_eq!(attendee.email, "alice@mail.com");
    assert_eq!(attendee.name, "Alice");
    assert!(!attendee.created_at.is_empty());
}

#[test]
fn register_rejects_invalid_email() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA3");

    let err = service
        .register_attendee("QA3", &RegisterAttendeeRequest::new("bad", "Alice"))
        .unwrap_err();
    assert!(matches!(
        err,
        CheckinServiceError::Validation(ValidationError::InvalidEmail {
            field: "attendee.email"
        })
    ));
    assert_eq!(err.to_string(), "attendee.email must be a valid email");
}

#[test]
fn register_rejects_blank_event_code() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .register_attendee(" ", &RegisterAttendeeRequest::new("a@mail.com", "A"))
        .unwrap_err();
    assert_eq!(err.to_string(), "event_code must be a non-empty string");
}

#[test]
fn register_for_unknown_event_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .register_attendee("NOPE", &RegisterAttendeeRequest::new("a@mail.com", "A"))
        .unwrap_err();
    assert!(matches!(err, CheckinServiceError::EventNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "event not found");
}

#[test]
fn duplicate_registration_is_blocked_regardless_of_casing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA300");
    service
        .register_attendee("QA300", &RegisterAttendeeRequest::new("dup@mail.com", "First"))
        .unwrap();

    let err = service
        .register_attendee(
            "qa300",
            &RegisterAttendeeRequest::new(" DUP@mail.com ", "FIRST"),
        )
        .unwrap_err();
    assert!(matches!(err, CheckinServiceError::DuplicateRegistration { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "duplicate registration");
}

#[test]
fn same_email_may_register_for_different_events() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "A1");
    seed_event(&service, "B1");

    let request = RegisterAttendeeRequest::new("amy@mail.com", "Amy");
    let first = service.register_attendee("A1", &request).unwrap();
    let second = service.register_attendee("B1", &request).unwrap();
    assert_ne!(first.event_id, second.event_id);
}

#[test]
fn check_in_then_report_lists_attendee() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create_event(&CreateEventRequest::new("QA200", "Checkin Test", "2026-03-11"))
        .unwrap();
    let attendee = service
        .register_attendee("QA200", &RegisterAttendeeRequest::new("bob@mail.com", "Bob"))
        .unwrap();

    let checkin = service.check_in_attendee("qa200", " BOB@mail.com").unwrap();
    assert_eq!(checkin.attendee_id, attendee.id);
    assert_eq!(checkin.event_id, attendee.event_id);
    assert!(!checkin.checked_in_at.is_empty());

    let report = service.get_attendance_report("QA200").unwrap();
    assert_eq!(report.total_registered, 1);
    assert_eq!(report.total_checked_in, 1);
    assert_eq!(report.checked_in_attendees[0].email, "bob@mail.com");
    assert_eq!(report.checked_in_attendees[0].name, "Bob");
    assert_eq!(
        report.checked_in_attendees[0].checked_in_at,
        checkin.checked_in_at
    );
}

#[test]
fn second_check_in_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA4");
    service
        .register_attendee("QA4", &RegisterAttendeeRequest::new("eve@mail.com", "Eve"))
        .unwrap();
    service.check_in_attendee("QA4", "eve@mail.com").unwrap();

    let err = service.check_in_attendee("QA4", "EVE@mail.com").unwrap_err();
    assert!(matches!(err, CheckinServiceError::AlreadyCheckedIn { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "attendee already checked in");
}

#[test]
fn check_in_of_unregistered_email_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "QA5");
    seed_event(&service, "QA6");
    service
        .register_attendee("QA6", &RegisterAttendeeRequest::new("sam@mail.com", "Sam"))
        .unwrap();

    let err = service.check_in_attendee("QA5", "sam@mail.com").unwrap_err();
    assert!(matches!(err, CheckinServiceError::AttendeeNotRegistered { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "attendee not registered");
}

#[test]
fn check_in_validates_email_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.check_in_attendee("MISSING", "nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "email must be a valid email");
}

#[test]
fn report_for_unknown_event_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.get_attendance_report("GHOST").unwrap_err();
    assert!(matches!(
        err,
        CheckinServiceError::EventNotFound { ref event_code } if event_code == "GHOST"
    ));
}

#[test]
fn report_counts_never_exceed_registrations_and_sort_by_email() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "BIG");

    let emails = [
        "zed@mail.com",
        "amy@mail.com",
        "kim@mail.com",
        "bea@mail.com",
        "lou@mail.com",
    ];
    for (idx, email) in emails.iter().enumerate() {
        service
            .register_attendee("BIG", &RegisterAttendeeRequest::new(*email, "Guest"))
            .unwrap();
        if idx % 2 == 0 {
            service.check_in_attendee("BIG", email).unwrap();
        }
        let report = service.get_attendance_report("big").unwrap();
        assert!(report.total_checked_in <= report.total_registered);
    }

    let report = service.get_attendance_report("BIG").unwrap();
    assert_eq!(report.total_registered, 5);
    assert_eq!(report.total_checked_in, 3);
    let listed: Vec<_> = report
        .checked_in_attendees
        .iter()
        .map(|row| row.email.as_str())
        .collect();
    assert_eq!(listed, vec!["kim@mail.com", "lou@mail.com", "zed@mail.com"]);
}

#[test]
fn report_serializes_with_snake_case_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_event(&service, "JSON1");

    let report = service.get_attendance_report("JSON1").unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["event_name"], "Seeded");
    assert_eq!(json["total_registered"], 0);
    assert_eq!(json["checked_in_attendees"], serde_json::json!([]));
}

/// Repository whose lookups always miss while inserts hit a unique
/// constraint, as when another writer commits between check and insert.
struct LosingRaceRepository;

impl LosingRaceRepository {
    const EVENT_ID: RecordId = 7;
}

impl EventRepository for LosingRaceRepository {
    fn insert_event(&self, _: &str, _: &str, _: &str) -> RepoResult<Event> {
        Err(RepoError::UniqueViolation { table: "events" })
    }

    fn find_event_by_code(&self, event_code: &str) -> RepoResult<Option<Event>> {
        Ok(Some(Event {
            id: Self::EVENT_ID,
            event_code: event_code.to_string(),
            name: "Race".to_string(),
            event_date: "2026-03-10".to_string(),
        }))
    }

    fn insert_attendee(&self, _: RecordId, _: &str, _: &str) -> RepoResult<RecordId> {
        Err(RepoError::UniqueViolation { table: "attendees" })
    }

    fn get_attendee(&self, _: RecordId) -> RepoResult<Option<Attendee>> {
        Ok(None)
    }

    fn find_attendee_by_email(
        &self,
        event_id: RecordId,
        email: &str,
    ) -> RepoResult<Option<Attendee>> {
        // Registration pre-check misses; check-in resolves the attendee.
        if email.starts_with("late") {
            return Ok(None);
        }
        Ok(Some(Attendee {
            id: 11,
            event_id,
            email: email.to_string(),
            name: "Racer".to_string(),
            created_at: "2026-03-10 09:00:00".to_string(),
        }))
    }

    fn count_registered(&self, _: RecordId) -> RepoResult<u64> {
        Ok(0)
    }

    fn insert_checkin(&self, _: RecordId, _: RecordId) -> RepoResult<RecordId> {
        Err(RepoError::UniqueViolation { table: "checkins" })
    }

    fn get_checkin(&self, _: RecordId) -> RepoResult<Option<CheckIn>> {
        Ok(None)
    }

    fn is_checked_in(&self, _: RecordId, _: RecordId) -> RepoResult<bool> {
        Ok(false)
    }

    fn count_checked_in(&self, _: RecordId) -> RepoResult<u64> {
        Ok(0)
    }

    fn list_checked_in_attendees(&self, _: RecordId) -> RepoResult<Vec<CheckedInAttendee>> {
        Ok(Vec::new())
    }
}

#[test]
fn registration_losing_insert_race_is_a_duplicate_registration() {
    let service = CheckinService::new(LosingRaceRepository);

    let err = service
        .register_attendee("race1", &RegisterAttendeeRequest::new("late@mail.com", "Late"))
        .unwrap_err();
    assert!(matches!(
        err,
        CheckinServiceError::DuplicateRegistration { ref event_code } if event_code == "RACE1"
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn check_in_losing_insert_race_is_already_checked_in() {
    let service = CheckinService::new(LosingRaceRepository);

    let err = service
        .check_in_attendee("race1", "racer@mail.com")
        .unwrap_err();
    assert!(matches!(
        err,
        CheckinServiceError::AlreadyCheckedIn { ref event_code } if event_code == "RACE1"
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn create_event_losing_insert_race_is_a_duplicate_event_code() {
    let service = CheckinService::new(LosingRaceRepository);

    let err = service
        .create_event(&CreateEventRequest::new("race1", "Race", "2026-03-10"))
        .unwrap_err();
    assert!(matches!(err, CheckinServiceError::DuplicateEventCode { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
