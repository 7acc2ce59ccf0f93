//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use activity_index::{
    parse_datetime, DateInterval, DocScalar, DocumentMapper, FieldData, FieldValue,
    IndexDocument, MapperConfig, MemoryRecordStore, MemoryThesaurus, PostalAddress, Record,
    RecordType, SchemaRegistry, VocabularyEntry,
};
use chrono::{DateTime, FixedOffset};

// ============================================================================
// Vocabularies
// ============================================================================

/// Table listing the topic vocabularies
pub const TOPIC_TYPES: &str = "table:topic-type";
/// Hierarchical subject thesaurus
pub const SUBJECTS: &str = "thesaurus:subjects";
/// Hierarchical geographic thesaurus
pub const GEO: &str = "thesaurus:geo";

/// Thesaurus with two hierarchical vocabularies (`subject`, `geo`) and one
/// flat vocabulary (`free`)
///
/// ```text
/// arts ── music ── jazz
///      └─ theatre
/// world ── europe ── france ── brittany
///                 └─ spain
/// ```
pub fn test_thesaurus() -> MemoryThesaurus {
    MemoryThesaurus::new()
        .with_vocabulary(
            TOPIC_TYPES,
            vec![
                VocabularyEntry::new("free", "table:free-keywords"),
                VocabularyEntry::new("subject", SUBJECTS),
                VocabularyEntry::new("geo", GEO),
            ],
        )
        .with_term(SUBJECTS, "arts", None)
        .with_term(SUBJECTS, "music", Some("arts"))
        .with_term(SUBJECTS, "jazz", Some("music"))
        .with_term(SUBJECTS, "theatre", Some("arts"))
        .with_term(GEO, "world", None)
        .with_term(GEO, "europe", Some("world"))
        .with_term(GEO, "france", Some("europe"))
        .with_term(GEO, "brittany", Some("france"))
        .with_term(GEO, "spain", Some("europe"))
}

// ============================================================================
// Fixture
// ============================================================================

/// Registry, collaborators and config wired together
pub struct Fixture {
    pub thesaurus: MemoryThesaurus,
    pub store: MemoryRecordStore,
    pub config: MapperConfig,
    pub registry: SchemaRegistry,
}

impl Fixture {
    /// Empty store, test thesaurus, default config
    pub fn new() -> Self {
        let thesaurus = test_thesaurus();
        let registry = SchemaRegistry::with_defaults(&thesaurus).unwrap();
        Fixture {
            thesaurus,
            store: MemoryRecordStore::new(),
            config: MapperConfig::default(),
            registry,
        }
    }

    /// Fixture with the places used across the suites:
    /// - 10: Rennes and Nantes (EU/FR)
    /// - 11: Madrid (EU/ES)
    /// - 12: Quebec (NA/CA)
    /// - 13: an address without a country
    pub fn with_places() -> Self {
        let mut fx = Fixture::new();
        fx.store.insert_place(
            10,
            vec![
                PostalAddress::new(Some("Rennes"), "EU", "FR"),
                PostalAddress::new(Some("Nantes"), "EU", "FR"),
            ],
        );
        fx.store
            .insert_place(11, vec![PostalAddress::new(Some("Madrid"), "EU", "ES")]);
        fx.store
            .insert_place(12, vec![PostalAddress::new(Some("Quebec"), "NA", "CA")]);
        fx.store
            .insert_place(13, vec![PostalAddress::new(Some("Nowhere"), "", "")]);
        fx
    }

    pub fn mapper(&self) -> DocumentMapper<'_> {
        DocumentMapper::new(&self.registry, &self.store, &self.thesaurus, &self.config)
    }

    pub fn map(&self, record: &Record) -> IndexDocument {
        self.mapper().map(record).unwrap()
    }
}

// ============================================================================
// Record helpers
// ============================================================================

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn at(s: &str) -> DateTime<FixedOffset> {
    parse_datetime(s, utc()).unwrap()
}

pub fn interval(start: &str, end: Option<&str>) -> FieldValue {
    FieldValue::Interval(DateInterval::new(at(start), end.map(at)))
}

pub fn work(id: u64) -> Record {
    Record::new(RecordType::Work, id)
}

pub fn event(id: u64) -> Record {
    Record::new(RecordType::Event, id)
}

/// Event of work `parent`
pub fn event_of(id: u64, parent: u64) -> Record {
    event(id).with("work", [FieldValue::relation("", parent)])
}

/// Texts stored under `key` as owned strings
pub fn texts(doc: &IndexDocument, key: &str) -> Vec<String> {
    doc.texts(key).into_iter().map(str::to_string).collect()
}

/// True when no list in the document serializes as a JSON object
pub fn lists_are_dense(doc: &IndexDocument) -> bool {
    doc.to_json()
        .as_object()
        .map(|o| {
            o.iter().all(|(key, value)| match value {
                serde_json::Value::Object(_) => false,
                serde_json::Value::Array(items) => {
                    key != "startend" || items.iter().all(|i| i.is_object())
                }
                _ => true,
            })
        })
        .unwrap_or(false)
}
