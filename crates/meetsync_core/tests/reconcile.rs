use chrono::NaiveDate;
use meetsync_core::db::open_db_in_memory;
use meetsync_core::{
    reconcile, Event, EventKind, MeetupRepository, RepoError, SqliteMeetupRepository,
};
use rusqlite::Connection;

#[test]
fn reconcile_inserts_batch_and_reports_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let events = vec![meetup("cnmu", "1"), meetup("cnmu", "2")];

    let report = reconcile(&mut conn, "cnmu", &events, false).unwrap();

    assert_eq!(report.upserted, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.deleted, 0);

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    assert!(repo.exists("cnmu-1").unwrap());
    assert!(repo.exists("cnmu-2").unwrap());
}

#[test]
fn reconcile_same_batch_twice_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let events = vec![meetup("cnmu", "1"), meetup("cnmu", "2")];

    reconcile(&mut conn, "cnmu", &events, false).unwrap();
    let second = reconcile(&mut conn, "cnmu", &events, false).unwrap();

    assert_eq!(second.upserted, 2);
    assert_eq!(row_count(&conn), 2);

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    let loaded = repo.get("cnmu-1").unwrap().unwrap();
    assert_eq!(loaded, events[0]);
}

#[test]
fn reconcile_replaces_changed_rows_wholesale() {
    let mut conn = open_db_in_memory().unwrap();

    let mut event = meetup("cnmu", "1");
    event.location = Some("Flying Dodo".to_string());
    reconcile(&mut conn, "cnmu", &[event.clone()], false).unwrap();

    // A later batch where resolution came back unknown must clear the
    // stale venue.
    event.title = "Renamed session".to_string();
    event.location = None;
    reconcile(&mut conn, "cnmu", &[event], false).unwrap();

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    let loaded = repo.get("cnmu-1").unwrap().unwrap();
    assert_eq!(loaded.title, "Renamed session");
    assert_eq!(loaded.location, None);
}

#[test]
fn full_listing_sweeps_rows_absent_from_batch() {
    let mut conn = open_db_in_memory().unwrap();
    reconcile(&mut conn, "frontendmu", &[meetup("frontendmu", "9")], false).unwrap();

    let first = vec![
        meetup("cnmu", "1"),
        meetup("cnmu", "2"),
        meetup("cnmu", "3"),
    ];
    reconcile(&mut conn, "cnmu", &first, true).unwrap();

    let second = vec![meetup("cnmu", "1"), meetup("cnmu", "3")];
    let report = reconcile(&mut conn, "cnmu", &second, true).unwrap();

    assert_eq!(report.upserted, 2);
    assert_eq!(report.deleted, 1);

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    assert!(repo.exists("cnmu-1").unwrap());
    assert!(!repo.exists("cnmu-2").unwrap());
    assert!(repo.exists("cnmu-3").unwrap());
    assert!(repo.exists("frontendmu-9").unwrap());
}

#[test]
fn partial_listing_never_deletes() {
    let mut conn = open_db_in_memory().unwrap();

    let first = vec![
        meetup("cnmu", "1"),
        meetup("cnmu", "2"),
        meetup("cnmu", "3"),
    ];
    reconcile(&mut conn, "cnmu", &first, false).unwrap();

    let report = reconcile(&mut conn, "cnmu", &[meetup("cnmu", "2")], false).unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(row_count(&conn), 3);
}

#[test]
fn conflicting_row_is_skipped_and_batch_continues() {
    let mut conn = open_db_in_memory().unwrap();

    let first = meetup("cnmu", "1");
    let mut duplicate = meetup("cnmu", "2");
    duplicate.registration_url = first.registration_url.clone();
    let third = meetup("cnmu", "3");

    let report = reconcile(
        &mut conn,
        "cnmu",
        &[first, duplicate, third],
        false,
    )
    .unwrap();

    assert_eq!(report.upserted, 2);
    assert_eq!(report.skipped, 1);

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    assert!(repo.exists("cnmu-1").unwrap());
    assert!(!repo.exists("cnmu-2").unwrap());
    assert!(repo.exists("cnmu-3").unwrap());
}

#[test]
fn invalid_row_is_skipped_and_batch_continues() {
    let mut conn = open_db_in_memory().unwrap();

    let mut blank_title = meetup("cnmu", "2");
    blank_title.title = "  ".to_string();

    let report = reconcile(
        &mut conn,
        "cnmu",
        &[meetup("cnmu", "1"), blank_title],
        false,
    )
    .unwrap();

    assert_eq!(report.upserted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn skipped_row_ids_still_count_for_the_sweep() {
    let mut conn = open_db_in_memory().unwrap();
    reconcile(&mut conn, "cnmu", &[meetup("cnmu", "2")], false).unwrap();

    // "cnmu-2" fails its upsert this round but is still in the listing,
    // so the sweep must not remove its existing row.
    let first = meetup("cnmu", "1");
    let mut conflicting = meetup("cnmu", "2");
    conflicting.registration_url = first.registration_url.clone();

    let report = reconcile(&mut conn, "cnmu", &[first, conflicting], true).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.deleted, 0);

    let repo = SqliteMeetupRepository::try_new(&conn).unwrap();
    assert!(repo.exists("cnmu-1").unwrap());
    assert!(repo.exists("cnmu-2").unwrap());
}

#[test]
fn fatal_error_rolls_back_without_schema() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE meetups;").unwrap();

    let err = reconcile(&mut conn, "cnmu", &[meetup("cnmu", "1")], false).unwrap_err();
    assert!(matches!(err, RepoError::MissingRequiredTable("meetups")));
}

fn meetup(community: &str, native_id: &str) -> Event {
    Event {
        id: format!("{community}-{native_id}"),
        community: community.to_string(),
        title: format!("{community} session {native_id}"),
        registration_url: format!("https://example.test/{community}/{native_id}"),
        kind: EventKind::Meetup,
        location: None,
        abstract_text: String::new(),
        date: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
    }
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM meetups;", [], |row| row.get(0))
        .unwrap()
}
