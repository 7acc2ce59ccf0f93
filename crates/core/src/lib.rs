//! Core types and traits for activity indexing
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordType / RecordId: record identity
//! - FieldValue: tagged union of scalar, typed value, topic, relation, interval
//! - Record: a record with its field values, ingestible from stored JSON
//! - Field schema model: ordered field descriptors per record type
//! - Error: error type hierarchy
//! - Traits: collaborator interfaces (RecordStore, Thesaurus)
//! - Memory collaborators for tests and small embeddings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod record;
pub mod schema;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use memory::{MemoryRecordStore, MemoryThesaurus};
pub use record::Record;
pub use schema::{schema_for, schema_named, FieldKind, FieldSchema, RecordSchema, ScalarKind};
pub use traits::{RecordStore, Thesaurus, VocabularyEntry, THESAURUS_PREFIX};
pub use types::{RecordId, RecordType};
pub use value::{
    derived_key, format_datetime, parse_datetime, DateInterval, FieldValue, PostalAddress, Scalar,
    TopicValue, TypedRelation, TypedValue,
};
