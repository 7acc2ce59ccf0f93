//! Collaborator traits consumed by the mapping pipeline
//!
//! The mapper never owns storage. It resolves related records and thesaurus
//! terms through these traits, which the embedding application implements
//! on top of its own stores (in-process caches, not network calls).
//!
//! Thread safety: implementations are shared across concurrent mapping
//! calls, so all methods take `&self` and the traits require `Send + Sync`.

use crate::record::Record;
use crate::types::{RecordId, RecordType};
use crate::value::PostalAddress;
use serde::{Deserialize, Serialize};

/// Read access to stored records
pub trait RecordStore: Send + Sync {
    /// Fetch a record
    ///
    /// Returns None when the record does not exist (deleted or never
    /// created). Callers treat that as an unresolved relation.
    fn get_record(&self, record_type: RecordType, id: RecordId) -> Option<Record>;

    /// Postal addresses of a place record
    ///
    /// Returns None when the place does not resolve, and an empty list for a
    /// place without addresses.
    fn postal_addresses(&self, place: RecordId) -> Option<Vec<PostalAddress>>;
}

/// Prefix of vocabulary sources backed by a hierarchical thesaurus
pub const THESAURUS_PREFIX: &str = "thesaurus:";

/// One row of a topic vocabulary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Topic type code (e.g. `subject`)
    pub code: String,
    /// Table the terms come from (`thesaurus:...` or `table:...`)
    pub source: String,
}

impl VocabularyEntry {
    /// Vocabulary row
    pub fn new(code: &str, source: &str) -> Self {
        VocabularyEntry {
            code: code.to_string(),
            source: source.to_string(),
        }
    }

    /// True when the terms come from a hierarchical thesaurus
    pub fn is_thesaurus(&self) -> bool {
        self.source.starts_with(THESAURUS_PREFIX)
    }
}

/// Read access to authority tables and thesauri
pub trait Thesaurus: Send + Sync {
    /// Ancestors of a term, nearest first
    ///
    /// Returns an empty list for a root term and for a term the table does
    /// not contain.
    fn ancestors(&self, table: &str, term: &str) -> Vec<String>;

    /// Rows of a vocabulary table, in table order
    fn vocabulary(&self, table: &str) -> Vec<VocabularyEntry>;
}
