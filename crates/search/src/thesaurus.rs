//! Thesaurus path resolution
//!
//! Hierarchical facets need every term together with its broader terms:
//! a record indexed with `brittany` must also be found under `france` and
//! `europe`. [`PathResolver`] expands terms through a [`Thesaurus`] and
//! [`PathResolver::thesaurus_topics`] tells which topic vocabularies are
//! hierarchical at all.

use crate::document::dedup_in_order;
use activity_core::{RecordSchema, Thesaurus};
use tracing::debug;

/// A topic vocabulary backed by a thesaurus table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThesaurusTopic {
    /// Thesaurus table holding the terms
    pub table: String,
    /// Topic type code
    pub topic: String,
}

impl ThesaurusTopic {
    /// Vocabulary `topic` backed by `table`
    pub fn new(table: &str, topic: &str) -> Self {
        ThesaurusTopic {
            table: table.to_string(),
            topic: topic.to_string(),
        }
    }
}

/// Expands terms into hierarchy paths
#[derive(Clone, Copy)]
pub struct PathResolver<'a> {
    thesaurus: &'a dyn Thesaurus,
}

impl<'a> PathResolver<'a> {
    /// Resolver reading from `thesaurus`
    pub fn new(thesaurus: &'a dyn Thesaurus) -> Self {
        PathResolver { thesaurus }
    }

    /// Hierarchy path of a set of terms
    ///
    /// For each term, in input order, appends the term followed by its
    /// ancestors (nearest first). Only the first occurrence of a string is
    /// kept. A term the table does not know contributes itself only.
    ///
    /// # Example
    ///
    /// ```
    /// use activity_core::MemoryThesaurus;
    /// use activity_search::PathResolver;
    ///
    /// let thesaurus = MemoryThesaurus::new()
    ///     .with_term("thesaurus:geo", "europe", None)
    ///     .with_term("thesaurus:geo", "france", Some("europe"))
    ///     .with_term("thesaurus:geo", "spain", Some("europe"));
    /// let resolver = PathResolver::new(&thesaurus);
    /// assert_eq!(
    ///     resolver.resolve_path("thesaurus:geo", ["france", "spain"]),
    ///     vec!["france", "europe", "spain"]
    /// );
    /// ```
    pub fn resolve_path<I, S>(&self, table: &str, terms: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let expanded = terms.into_iter().flat_map(|term| {
            let term = term.as_ref();
            let ancestors = self.thesaurus.ancestors(table, term);
            if ancestors.is_empty() {
                debug!(target: "activity::thesaurus", table, term, "Term has no ancestors");
            }
            std::iter::once(term.to_string()).chain(ancestors)
        });
        dedup_in_order(expanded)
    }

    /// Topic vocabularies of a record type that are backed by a thesaurus
    ///
    /// Reads the vocabulary table of the schema's topic field and keeps the
    /// rows whose source is a `thesaurus:` table, in table order.
    pub fn thesaurus_topics(&self, schema: &RecordSchema) -> Vec<ThesaurusTopic> {
        let Some(table) = schema.topic_vocabulary_table() else {
            return Vec::new();
        };
        self.thesaurus
            .vocabulary(table)
            .into_iter()
            .filter(|entry| entry.is_thesaurus())
            .map(|entry| ThesaurusTopic::new(&entry.source, &entry.code))
            .collect()
    }
}
