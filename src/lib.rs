//! activity-index - search documents for activity and event records
//!
//! Converts typed work and event records into flat documents for a search
//! engine: typed sub-fields become derived keys, thesaurus terms become
//! hierarchy paths, event dates and places are aggregated, and an event
//! inherits selected fields from its parent work.
//!
//! # Quick Start
//!
//! ```
//! use activity_index::{
//!     DocumentMapper, FieldValue, MapperConfig, MemoryRecordStore, MemoryThesaurus, Record,
//!     RecordType, SchemaRegistry,
//! };
//!
//! let thesaurus = MemoryThesaurus::new();
//! let mut store = MemoryRecordStore::new();
//! store.insert(
//!     Record::new(RecordType::Work, 1)
//!         .with("name", [FieldValue::typed_text("", "Spring festival")])
//!         .with("person", [FieldValue::relation("director", 30)]),
//! );
//!
//! let config = MapperConfig::default();
//! let registry = SchemaRegistry::with_defaults(&thesaurus)?;
//! let mapper = DocumentMapper::new(&registry, &store, &thesaurus, &config);
//!
//! let event = Record::new(RecordType::Event, 2).with("work", [FieldValue::relation("", 1)]);
//! let doc = mapper.map(&event)?;
//! assert_eq!(doc.integers("person-director"), vec![30]);
//! # Ok::<(), activity_index::Error>(())
//! ```
//!
//! # Architecture
//!
//! `activity-core` holds the record model, the field schemas and the
//! collaborator traits. `activity-search` holds everything that produces
//! index documents. Both are re-exported here.

pub use activity_core::*;
pub use activity_search::*;
