use chrono::NaiveDate;
use meetsync_core::{parse_cnmu, parse_frontendmu, JsonSourceError};

#[test]
fn frontendmu_maps_records_and_derives_fields() {
    let raw = r#"[
        {"id": 17, "title": "March session", "Date": "2025-03-14", "Venue": "Coder Faculty", "accepting_rsvp": true},
        {"id": "special-edition", "title": "Hackathon", "Date": "2025-04-02"}
    ]"#;

    let candidates = parse_frontendmu(raw).unwrap();
    assert_eq!(candidates.len(), 2);

    let first = &candidates[0];
    assert_eq!(first.native_id, "17");
    assert_eq!(first.title, "FrontendMU March session");
    assert_eq!(first.registration_url, "https://frontend.mu/meetup/17");
    assert_eq!(first.location.as_deref(), Some("Coder Faculty"));
    assert_eq!(first.description, "");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());

    let second = &candidates[1];
    assert_eq!(second.native_id, "special-edition");
    assert_eq!(
        second.registration_url,
        "https://frontend.mu/meetup/special-edition"
    );
    assert_eq!(second.location, None);
}

#[test]
fn frontendmu_drops_records_closed_for_registration() {
    let raw = r#"[
        {"id": 1, "title": "Open", "Date": "2025-03-14"},
        {"id": 2, "title": "Closed", "Date": "2025-03-21", "accepting_rsvp": false}
    ]"#;

    let candidates = parse_frontendmu(raw).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].native_id, "1");
}

#[test]
fn frontendmu_empty_venue_is_unset() {
    let raw = r#"[{"id": 1, "title": "Open", "Date": "2025-03-14", "Venue": "  "}]"#;

    let candidates = parse_frontendmu(raw).unwrap();
    assert_eq!(candidates[0].location, None);
}

#[test]
fn frontendmu_bad_date_fails_the_whole_batch() {
    let raw = r#"[
        {"id": 1, "title": "Fine", "Date": "2025-03-14"},
        {"id": 2, "title": "Broken", "Date": "14/03/2025"}
    ]"#;

    let err = parse_frontendmu(raw).unwrap_err();
    match err {
        JsonSourceError::InvalidDate { native_id, value } => {
            assert_eq!(native_id, "2");
            assert_eq!(value, "14/03/2025");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn frontendmu_missing_field_fails_the_whole_batch() {
    let raw = r#"[{"id": 1, "Date": "2025-03-14"}]"#;

    let err = parse_frontendmu(raw).unwrap_err();
    assert!(matches!(err, JsonSourceError::Decode(_)));
}

#[test]
fn cnmu_maps_records_field_by_field() {
    let raw = r#"[
        {
            "id": 42,
            "title": "Kubernetes on a shoestring",
            "url": "https://cloudnativemauritius.com/meetups/42",
            "location": "Flying Dodo",
            "abstract": "Scaling on a budget.",
            "date": "2025-03-14"
        },
        {
            "id": 43,
            "title": "GitOps night",
            "url": "https://cloudnativemauritius.com/meetups/43",
            "location": null,
            "abstract": null,
            "date": "2025-04-02"
        }
    ]"#;

    let candidates = parse_cnmu(raw).unwrap();
    assert_eq!(candidates.len(), 2);

    let first = &candidates[0];
    assert_eq!(first.native_id, "42");
    assert_eq!(first.title, "Kubernetes on a shoestring");
    assert_eq!(
        first.registration_url,
        "https://cloudnativemauritius.com/meetups/42"
    );
    assert_eq!(first.location.as_deref(), Some("Flying Dodo"));
    assert_eq!(first.description, "Scaling on a budget.");

    let second = &candidates[1];
    assert_eq!(second.location, None);
    assert_eq!(second.description, "");
}

#[test]
fn cnmu_malformed_record_fails_the_whole_batch() {
    let raw = r#"[
        {"id": 42, "title": "No url", "location": null, "abstract": null, "date": "2025-03-14"}
    ]"#;

    let err = parse_cnmu(raw).unwrap_err();
    assert!(matches!(err, JsonSourceError::Decode(_)));
}

#[test]
fn cnmu_bad_date_fails_the_whole_batch() {
    let raw = r#"[
        {"id": 42, "title": "Bad date", "url": "https://example.test/42", "location": null, "abstract": null, "date": "soon"}
    ]"#;

    let err = parse_cnmu(raw).unwrap_err();
    assert!(matches!(
        err,
        JsonSourceError::InvalidDate { value, .. } if value == "soon"
    ));
}
