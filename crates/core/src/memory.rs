//! In-memory collaborators
//!
//! `MemoryRecordStore` and `MemoryThesaurus` implement the collaborator
//! traits over plain maps. They back tests and small embeddings where
//! records are already loaded in memory.

use crate::record::Record;
use crate::traits::{RecordStore, Thesaurus, VocabularyEntry};
use crate::types::{RecordId, RecordType};
use crate::value::PostalAddress;
use std::collections::{HashMap, HashSet};

/// Record store backed by hash maps
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    records: HashMap<(RecordType, RecordId), Record>,
    places: HashMap<RecordId, Vec<PostalAddress>>,
}

impl MemoryRecordStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn insert(&mut self, record: Record) {
        self.records.insert((record.record_type(), record.id()), record);
    }

    /// Insert or replace a place with its addresses
    pub fn insert_place(&mut self, id: u64, addresses: Vec<PostalAddress>) {
        self.places.insert(RecordId(id), addresses);
    }
}

impl RecordStore for MemoryRecordStore {
    fn get_record(&self, record_type: RecordType, id: RecordId) -> Option<Record> {
        self.records.get(&(record_type, id)).cloned()
    }

    fn postal_addresses(&self, place: RecordId) -> Option<Vec<PostalAddress>> {
        self.places.get(&place).cloned()
    }
}

/// Thesaurus backed by hash maps
///
/// Each term has at most one broader term; the ancestor chain is obtained by
/// following broader terms up to the root.
#[derive(Debug, Default, Clone)]
pub struct MemoryThesaurus {
    broader: HashMap<(String, String), Option<String>>,
    vocabularies: HashMap<String, Vec<VocabularyEntry>>,
}

impl MemoryThesaurus {
    /// Empty thesaurus
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term to a table, with its broader term (None for a root)
    pub fn add_term(&mut self, table: &str, term: &str, broader: Option<&str>) {
        self.broader.insert(
            (table.to_string(), term.to_string()),
            broader.map(str::to_string),
        );
    }

    /// Builder-style [`add_term`](Self::add_term)
    pub fn with_term(mut self, table: &str, term: &str, broader: Option<&str>) -> Self {
        self.add_term(table, term, broader);
        self
    }

    /// Replace the rows of a vocabulary table
    pub fn set_vocabulary(&mut self, table: &str, entries: Vec<VocabularyEntry>) {
        self.vocabularies.insert(table.to_string(), entries);
    }

    /// Builder-style [`set_vocabulary`](Self::set_vocabulary)
    pub fn with_vocabulary(mut self, table: &str, entries: Vec<VocabularyEntry>) -> Self {
        self.set_vocabulary(table, entries);
        self
    }
}

impl Thesaurus for MemoryThesaurus {
    fn ancestors(&self, table: &str, term: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(term.to_string());
        let mut current = term.to_string();
        while let Some(Some(parent)) = self.broader.get(&(table.to_string(), current.clone())) {
            // Stop on a cycle in badly maintained tables.
            if !seen.insert(parent.clone()) {
                break;
            }
            chain.push(parent.clone());
            current = parent.clone();
        }
        chain
    }

    fn vocabulary(&self, table: &str) -> Vec<VocabularyEntry> {
        self.vocabularies.get(table).cloned().unwrap_or_default()
    }
}
