//! Schema registry
//!
//! Holds, per record type, the field schema, the thesaurus-backed topic
//! vocabularies and the index schema. The registry is built once at startup
//! and is read-only afterwards: mapping calls share it by reference, from
//! any number of threads.

use crate::mapping::{index_schema_for, IndexSchema};
use crate::thesaurus::{PathResolver, ThesaurusTopic};
use activity_core::{schema_for, Error, RecordSchema, RecordType, Result, Thesaurus};
use std::collections::BTreeMap;
use tracing::info;

/// Everything the mapper needs about one record type
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredSchema {
    /// Field descriptors
    pub fields: RecordSchema,
    /// Topic vocabularies expanded into hierarchy paths
    pub thesaurus_topics: Vec<ThesaurusTopic>,
    /// Index schema the produced documents conform to
    pub index: IndexSchema,
}

/// Read-only registry of record types
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<RecordType, RegisteredSchema>,
}

impl SchemaRegistry {
    /// Registry of the built-in work and event schemas
    pub fn with_defaults(thesaurus: &dyn Thesaurus) -> Result<Self> {
        let mut builder = SchemaRegistryBuilder::new();
        for record_type in RecordType::ALL {
            builder = builder.register(schema_for(record_type)?.clone());
        }
        Ok(builder.build(thesaurus))
    }

    /// Start an empty registry
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Schemas of a record type
    ///
    /// # Errors
    ///
    /// Returns `SchemaNotFound` when the type was not registered.
    pub fn get(&self, record_type: RecordType) -> Result<&RegisteredSchema> {
        self.entries
            .get(&record_type)
            .ok_or_else(|| Error::SchemaNotFound(record_type.to_string()))
    }

    /// Index schema of a record type
    pub fn index_schema(&self, record_type: RecordType) -> Result<&IndexSchema> {
        self.get(record_type).map(|e| &e.index)
    }

    /// Registered record types
    pub fn record_types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.entries.keys().copied()
    }
}

/// Collects field schemas before the registry is built
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryBuilder {
    schemas: Vec<RecordSchema>,
}

impl SchemaRegistryBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field schema (replacing any schema of the same type)
    pub fn register(mut self, schema: RecordSchema) -> Self {
        self.schemas.retain(|s| s.record_type() != schema.record_type());
        self.schemas.push(schema);
        self
    }

    /// Compute the thesaurus topics and index schema of every registered type
    pub fn build(self, thesaurus: &dyn Thesaurus) -> SchemaRegistry {
        let resolver = PathResolver::new(thesaurus);
        let entries = self
            .schemas
            .into_iter()
            .map(|fields| {
                let record_type = fields.record_type();
                let thesaurus_topics = resolver.thesaurus_topics(&fields);
                let index = index_schema_for(record_type, &thesaurus_topics);
                info!(
                    target: "activity::registry",
                    record_type = %record_type,
                    fields = index.fields().len(),
                    hierarchies = thesaurus_topics.len(),
                    "Index schema built"
                );
                (
                    record_type,
                    RegisteredSchema {
                        fields,
                        thesaurus_topics,
                        index,
                    },
                )
            })
            .collect();
        SchemaRegistry { entries }
    }
}
