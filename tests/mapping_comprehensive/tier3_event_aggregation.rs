//! Tier 3: Event Aggregation
//!
//! Dates become `startend`, `startdate`, `enddate` and
//! `startdate-hierarchy`; places become `geoloc-hierarchy`; titles combine
//! name, cities and dates.

use crate::common::*;

// ============================================================================
// Dates
// ============================================================================

/// Earliest start and latest end across intervals
#[test]
fn test_tier3_date_span() {
    let fx = Fixture::new();
    let record = event(2).with(
        "startend",
        [
            interval("2020-03-01", Some("2020-03-02")),
            interval("2020-02-27", None),
        ],
    );
    let doc = fx.map(&record);

    assert_eq!(texts(&doc, "startdate"), vec!["2020-02-27T00:00:00+00:00"]);
    assert_eq!(texts(&doc, "enddate"), vec!["2020-03-02T00:00:00+00:00"]);
    assert_eq!(texts(&doc, "startdate-hierarchy"), vec!["2020"]);
}

/// A later interval with an end and an earlier one without
#[test]
fn test_tier3_date_span_missing_end() {
    let fx = Fixture::new();
    let record = event(2).with(
        "startend",
        [
            interval("2020-03-10", Some("2020-03-12")),
            interval("2020-03-01", None),
        ],
    );
    let doc = fx.map(&record);

    assert_eq!(texts(&doc, "startdate"), vec!["2020-03-01T00:00:00+00:00"]);
    assert_eq!(texts(&doc, "enddate"), vec!["2020-03-12T00:00:00+00:00"]);
    assert_eq!(texts(&doc, "startdate-hierarchy"), vec!["2020"]);
}

/// A missing end defaults to the start in the nested list
#[test]
fn test_tier3_startend_nested_objects() {
    let fx = Fixture::new();
    let record = event(2).with("startend", [interval("2021-07-14T20:00:00", None)]);
    let doc = fx.map(&record);

    let json = doc.to_json();
    assert_eq!(
        json["startend"],
        serde_json::json!([{
            "start": "2021-07-14T20:00:00+00:00",
            "end": "2021-07-14T20:00:00+00:00",
        }])
    );
}

/// Offsets are kept as given
#[test]
fn test_tier3_offsets_preserved() {
    let fx = Fixture::new();
    let start = parse_datetime("2020-06-01T10:00:00+02:00", utc()).unwrap();
    let record = event(2).with(
        "startend",
        [FieldValue::Interval(DateInterval::new(start, None))],
    );
    let doc = fx.map(&record);
    assert_eq!(texts(&doc, "startdate"), vec!["2020-06-01T10:00:00+02:00"]);
}

/// Intervals without a start are skipped; with none left there is no date key
#[test]
fn test_tier3_malformed_intervals() {
    let fx = Fixture::new();
    let record = event(2).with(
        "startend",
        [FieldValue::Interval(DateInterval {
            start: None,
            end: Some(at("2020-01-01")),
        })],
    );
    let doc = fx.map(&record);
    for key in ["startend", "startdate", "enddate", "startdate-hierarchy"] {
        assert!(!doc.contains_key(key), "{} should be absent", key);
    }
}

// ============================================================================
// Geolocation
// ============================================================================

/// Two places in the same country give one entry
#[test]
fn test_tier3_geoloc_dedup() {
    let mut fx = Fixture::with_places();
    fx.store
        .insert_place(14, vec![PostalAddress::new(Some("Brest"), "EU", "FR")]);
    let record = event(2).with(
        "place",
        [FieldValue::relation("venue", 10), FieldValue::relation("venue", 14)],
    );
    let doc = fx.map(&record);
    assert_eq!(texts(&doc, "geoloc-hierarchy"), vec!["EU/FR"]);
}

/// Order of first appearance, unresolved places and country-less addresses skipped
#[test]
fn test_tier3_geoloc_order_and_skips() {
    let fx = Fixture::with_places();
    let record = event(2).with(
        "place",
        [
            FieldValue::relation("venue", 12),
            FieldValue::relation("venue", 999),
            FieldValue::relation("venue", 13),
            FieldValue::relation("venue", 11),
            FieldValue::relation("venue", 10),
        ],
    );
    let doc = fx.map(&record);
    assert_eq!(
        texts(&doc, "geoloc-hierarchy"),
        vec!["NA/CA", "EU/ES", "EU/FR"]
    );
    assert_eq!(doc.integers("place"), vec![12, 999, 13, 11, 10]);
}

/// No resolvable place, no key
#[test]
fn test_tier3_geoloc_omitted_when_empty() {
    let fx = Fixture::with_places();
    let record = event(2).with("place", [FieldValue::relation("venue", 999)]);
    let doc = fx.map(&record);
    assert!(!doc.contains_key("geoloc-hierarchy"));
}

/// Event relations to other events get derived keys too
#[test]
fn test_tier3_event_relations() {
    let fx = Fixture::new();
    let record = event(2).with("event", [FieldValue::relation("followup", 3)]);
    let doc = fx.map(&record);
    assert_eq!(doc.integers("event"), vec![3]);
    assert_eq!(doc.integers("event-followup"), vec![3]);
}

// ============================================================================
// Titles
// ============================================================================

/// Name, unique cities and date range
#[test]
fn test_tier3_event_title() {
    let fx = Fixture::with_places();
    let record = event(2)
        .with("name", [FieldValue::typed_text("", "Opening night")])
        .with(
            "place",
            [FieldValue::relation("venue", 10), FieldValue::relation("venue", 11)],
        )
        .with("startend", [interval("2020-03-01", Some("2020-03-03"))]);
    let doc = fx.map(&record);
    assert_eq!(
        texts(&doc, "posttitle"),
        vec!["Opening night (Rennes / Nantes / Madrid, 01/03/2020 - 03/03/2020)"]
    );
}

/// Configured placeholders replace what is unknown
#[test]
fn test_tier3_title_placeholders_from_config() {
    let mut fx = Fixture::new();
    fx.config.untitled_event = "Untitled".to_string();
    fx.config.unknown_place = "somewhere".to_string();
    fx.config.unknown_date = "someday".to_string();
    let doc = fx.map(&event(2));
    assert_eq!(texts(&doc, "posttitle"), vec!["Untitled (somewhere, someday)"]);
}
