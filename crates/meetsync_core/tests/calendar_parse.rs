use chrono::NaiveDate;
use meetsync_core::{parse_calendar, BlockError};

#[test]
fn parses_two_events_with_folding_and_escapes() {
    let feed = "BEGIN:VCALENDAR\n\
                BEGIN:VEVENT\n\
                SUMMARY:Rust Nights \\, Episode 4\n\
                DTSTART;TZID=Indian/Mauritius:20250314T180000\n\
                URL;VALUE=URI:https://example.test/e/1\n\
                UID:evt-1@example.test\n\
                DESCRIPTION:Doors open 17:30. Location: Coder\n\
                \x20\x20Faculty\n\
                END:VEVENT\n\
                BEGIN:VEVENT\n\
                SUMMARY:Lightning Talks\n\
                DTSTART:20250402\n\
                URL:https://example.test/e/2\n\
                UID:evt-2@example.test\n\
                END:VEVENT\n\
                END:VCALENDAR\n";

    let parse = parse_calendar(feed);
    assert!(parse.errors.is_empty());
    assert_eq!(parse.candidates.len(), 2);

    let first = &parse.candidates[0];
    assert_eq!(first.title, "Rust Nights , Episode 4");
    assert_eq!(first.native_id, "evt-1@example.test");
    assert_eq!(first.registration_url, "https://example.test/e/1");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    // The description stays raw here; unescaping and cleanup happen in the
    // resolver preprocessing.
    assert_eq!(first.description, "Doors open 17:30. Location: Coder Faculty");
    assert_eq!(first.location, None);

    let second = &parse.candidates[1];
    assert_eq!(second.title, "Lightning Talks");
    assert_eq!(second.date, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    assert_eq!(second.description, "");
}

#[test]
fn malformed_block_is_isolated_from_the_rest() {
    let feed = "BEGIN:VEVENT\n\
                SUMMARY:First\n\
                DTSTART:20250314\n\
                URL:https://example.test/e/1\n\
                UID:evt-1\n\
                END:VEVENT\n\
                BEGIN:VEVENT\n\
                DTSTART:20250315\n\
                URL:https://example.test/e/2\n\
                UID:evt-2\n\
                END:VEVENT\n\
                BEGIN:VEVENT\n\
                SUMMARY:Third\n\
                DTSTART:20250316\n\
                URL:https://example.test/e/3\n\
                UID:evt-3\n\
                END:VEVENT\n";

    let parse = parse_calendar(feed);
    assert_eq!(parse.candidates.len(), 2);
    assert_eq!(parse.candidates[0].title, "First");
    assert_eq!(parse.candidates[1].title, "Third");
    assert_eq!(
        parse.errors,
        vec![BlockError::MissingProperty {
            index: 1,
            property: "SUMMARY"
        }]
    );
}

#[test]
fn one_bad_block_among_ten_keeps_the_other_nine() {
    let mut feed = String::new();
    for n in 0..10 {
        feed.push_str("BEGIN:VEVENT\n");
        if n != 4 {
            feed.push_str(&format!("SUMMARY:Event {n}\n"));
        }
        feed.push_str(&format!("DTSTART:202506{:02}\n", n + 1));
        feed.push_str(&format!("URL:https://example.test/e/{n}\n"));
        feed.push_str(&format!("UID:evt-{n}\n"));
        feed.push_str("END:VEVENT\n");
    }

    let parse = parse_calendar(&feed);
    assert_eq!(parse.candidates.len(), 9);
    assert!(parse.candidates.iter().all(|c| c.title != "Event 4"));
    assert_eq!(
        parse.errors,
        vec![BlockError::MissingProperty {
            index: 4,
            property: "SUMMARY"
        }]
    );
}

#[test]
fn invalid_start_date_is_a_local_error() {
    let feed = "BEGIN:VEVENT\n\
                SUMMARY:Broken date\n\
                DTSTART:next friday\n\
                URL:https://example.test/e/1\n\
                UID:evt-1\n\
                END:VEVENT\n";

    let parse = parse_calendar(feed);
    assert!(parse.candidates.is_empty());
    assert_eq!(
        parse.errors,
        vec![BlockError::InvalidDate {
            index: 0,
            value: "next friday".to_string()
        }]
    );
}

#[test]
fn stray_markers_are_ignored() {
    let feed = "END:VEVENT\n\
                BEGIN:VEVENT\n\
                SUMMARY:Kept\n\
                DTSTART:20250314\n\
                URL:https://example.test/e/1\n\
                UID:evt-1\n\
                BEGIN:VEVENT\n\
                END:VEVENT\n\
                BEGIN:VEVENT\n\
                SUMMARY:Unclosed at end of feed\n";

    let parse = parse_calendar(feed);
    assert_eq!(parse.candidates.len(), 1);
    assert_eq!(parse.candidates[0].title, "Kept");
    assert!(parse.errors.is_empty());
}

#[test]
fn empty_feed_produces_nothing() {
    let parse = parse_calendar("");
    assert!(parse.candidates.is_empty());
    assert!(parse.errors.is_empty());
}
