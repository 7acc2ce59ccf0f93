//! Index document mapping for activities and events
//!
//! This crate provides:
//! - PathResolver for thesaurus hierarchy paths
//! - MappingBuilder / IndexSchema for the index schema and dynamic templates
//! - SchemaRegistry, built once and shared by every mapping call
//! - DocumentMapper producing flat IndexDocuments from records
//! - merge / MergeRules for the event-from-work inheritance
//! - MapperConfig loaded from `activity-index.toml`
//!
//! # Usage
//!
//! ```
//! use activity_core::{FieldValue, MemoryRecordStore, MemoryThesaurus, Record, RecordType};
//! use activity_search::{DocumentMapper, MapperConfig, SchemaRegistry};
//!
//! let thesaurus = MemoryThesaurus::new();
//! let store = MemoryRecordStore::new();
//! let config = MapperConfig::default();
//! let registry = SchemaRegistry::with_defaults(&thesaurus)?;
//! let mapper = DocumentMapper::new(&registry, &store, &thesaurus, &config);
//!
//! let work = Record::new(RecordType::Work, 1)
//!     .with("name", [FieldValue::typed_text("acronym", "SF")]);
//! let doc = mapper.map(&work)?;
//! assert_eq!(doc.texts("name-acronym"), vec!["SF"]);
//! # Ok::<(), activity_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod inherit;
pub mod mapper;
pub mod mapping;
pub mod registry;
pub mod thesaurus;
pub mod title;

// Re-export commonly used types
pub use config::{MapperConfig, CONFIG_FILE_NAME};
pub use document::{DocScalar, FieldData, IndexDocument};
pub use inherit::{merge, MergePolicy, MergeRule, MergeRules};
pub use mapper::DocumentMapper;
pub use mapping::{DynamicTemplate, FieldMapping, IndexSchema, IndexType, MappingBuilder};
pub use registry::{RegisteredSchema, SchemaRegistry, SchemaRegistryBuilder};
pub use thesaurus::{PathResolver, ThesaurusTopic};
pub use title::{event_title, work_title};
