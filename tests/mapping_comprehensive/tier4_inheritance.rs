//! Tier 4: Inheritance
//!
//! An event takes the organizations and persons of its work (replacing its
//! own), lists the work's topics after its own, unions topic hierarchies and
//! never takes the work's name or content.

use crate::common::*;
use activity_index::{merge, MergePolicy, MergeRules};

fn festival() -> Record {
    work(1)
        .with("name", [FieldValue::typed_text("", "Jazz festival")])
        .with("content", [FieldValue::typed_text("summary", "Ten days of jazz")])
        .with("organization", [FieldValue::relation("producer", 7)])
        .with("person", [FieldValue::relation("director", 30)])
        .with(
            "topic",
            [
                FieldValue::topic("subject", &["jazz"]),
                FieldValue::topic("free", &["outdoor"]),
            ],
        )
        .with("link", [FieldValue::typed_text("site", "https://jazz.example")])
}

fn fixture() -> Fixture {
    let mut fx = Fixture::with_places();
    fx.store.insert(festival());
    fx
}

/// Parent organizations and persons replace the event's
#[test]
fn test_tier4_overwrite() {
    let fx = fixture();
    let record = event_of(2, 1)
        .with("organization", [FieldValue::relation("sponsor", 8)])
        .with("person", [FieldValue::relation("director", 31)]);
    let doc = fx.map(&record);

    assert_eq!(doc.integers("organization"), vec![7]);
    assert_eq!(doc.integers("organization-producer"), vec![7]);
    assert_eq!(doc.integers("person"), vec![30]);
    assert_eq!(doc.integers("person-director"), vec![30]);
    // No parent counterpart: the event keeps it
    assert_eq!(doc.integers("organization-sponsor"), vec![8]);
}

/// Work topics follow the event's; hierarchies are unioned, work paths first
#[test]
fn test_tier4_topic_merge() {
    let fx = fixture();
    let record = event_of(2, 1).with(
        "topic",
        [
            FieldValue::topic("subject", &["theatre", "jazz"]),
            FieldValue::topic("free", &["night"]),
        ],
    );
    let doc = fx.map(&record);

    assert_eq!(
        texts(&doc, "topic"),
        vec!["theatre", "jazz", "night", "jazz", "outdoor"]
    );
    assert_eq!(texts(&doc, "topic-subject"), vec!["theatre", "jazz", "jazz"]);
    assert_eq!(texts(&doc, "topic-free"), vec!["night", "outdoor"]);
    assert_eq!(
        texts(&doc, "topic-subject-hierarchy"),
        vec!["jazz", "music", "arts", "theatre"]
    );
}

/// The event without own topics receives the parent's
#[test]
fn test_tier4_topics_backfilled() {
    let fx = fixture();
    let doc = fx.map(&event_of(2, 1));
    assert_eq!(texts(&doc, "topic-subject"), vec!["jazz"]);
    assert_eq!(
        texts(&doc, "topic-subject-hierarchy"),
        vec!["jazz", "music", "arts"]
    );
}

/// Name, content and links of the work never reach the event
#[test]
fn test_tier4_excluded_fields() {
    let fx = fixture();
    let doc = fx.map(&event_of(2, 1));
    for key in ["name", "content", "content-summary", "link", "link-site"] {
        assert!(!doc.contains_key(key), "{} should not be inherited", key);
    }
    // The title still falls back to the work's name
    assert_eq!(
        texts(&doc, "posttitle"),
        vec!["Jazz festival (lieu inconnu, date inconnue)"]
    );
}

/// The event keeps its own name and content
#[test]
fn test_tier4_own_name_kept() {
    let fx = fixture();
    let record = event_of(2, 1).with("name", [FieldValue::typed_text("", "Closing concert")]);
    let doc = fx.map(&record);
    assert_eq!(texts(&doc, "name"), vec!["Closing concert"]);
}

/// An unknown parent is skipped, the event maps on its own
#[test]
fn test_tier4_unresolved_parent() {
    let fx = fixture();
    let record = event_of(2, 404).with("person", [FieldValue::relation("guest", 31)]);
    let doc = fx.map(&record);
    assert_eq!(doc.integers("work"), vec![404]);
    assert!(matches!(doc.get("work"), Some(FieldData::Single(_))));
    assert_eq!(doc.integers("person"), vec![31]);
    assert!(!doc.contains_key("topic"));
}

/// Custom rules replace the default inheritance
#[test]
fn test_tier4_custom_rules() {
    let fx = fixture();
    let rules = MergeRules::new().with("person", MergePolicy::Merge);
    let mapper = fx.mapper().with_rules(rules);
    let record = event_of(2, 1).with("person", [FieldValue::relation("guest", 31)]);
    let doc = mapper.map(&record).unwrap();

    assert_eq!(doc.integers("person"), vec![30, 31]);
    assert!(!doc.contains_key("organization"));
    assert!(!doc.contains_key("topic"));
}

/// `[A, B]` merged with `[A, C]` gives `[A, B, C]`
#[test]
fn test_tier4_merge_function() {
    let mut parent = IndexDocument::new();
    parent.set_list(
        "topic-subject-hierarchy",
        vec![DocScalar::text("A"), DocScalar::text("B")],
    );
    let mut child = IndexDocument::new();
    child.set_list(
        "topic-subject-hierarchy",
        vec![DocScalar::text("A"), DocScalar::text("C")],
    );
    merge(&mut child, &parent, &MergeRules::event_from_work());
    assert_eq!(texts(&child, "topic-subject-hierarchy"), vec!["A", "B", "C"]);
}

/// A parent path that already holds the event's terms keeps its order
#[test]
fn test_tier4_merge_keeps_parent_order() {
    let mut parent = IndexDocument::new();
    parent.set_list(
        "topic-subject-hierarchy",
        vec![DocScalar::text("y"), DocScalar::text("x")],
    );
    let mut child = IndexDocument::new();
    child.set_list("topic-subject-hierarchy", vec![DocScalar::text("x")]);
    child.set_list("organization", vec![DocScalar::Integer(5)]);
    parent.set_list("organization", vec![DocScalar::Integer(7)]);

    merge(&mut child, &parent, &MergeRules::event_from_work());
    assert_eq!(texts(&child, "topic-subject-hierarchy"), vec!["y", "x"]);
    assert_eq!(child.integers("organization"), vec![7]);
}
