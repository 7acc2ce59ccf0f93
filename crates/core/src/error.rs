//! Error types for activity indexing
//!
//! This module defines all error types used by the record model and the
//! mapping pipeline. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! Only configuration-class failures are errors. Data irregularities
//! (unresolved relations, missing optional fields, intervals without a start)
//! never surface here: the mapper degrades by omitting output.

use thiserror::Error;

/// Result type alias for activity indexing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for activity indexing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// No field schema (or no index schema) is known for this record type
    #[error("Schema not found for record type '{0}'")]
    SchemaNotFound(String),

    /// A record carries a field its schema does not declare
    #[error("Unknown field '{field}' for record type '{record_type}'")]
    UnknownField {
        /// Record type being ingested
        record_type: String,
        /// Offending field name
        field: String,
    },

    /// A field value does not conform to its declared kind or cardinality
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidFieldValue {
        /// Field name
        field: String,
        /// What was wrong with the value
        reason: String,
    },

    /// A produced document key is not declared by the index schema
    #[error("Document key '{0}' is not declared by the index schema")]
    UndeclaredField(String),

    /// A date string could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidFieldValue`]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that abort the mapping of a record
    pub fn is_fatal_to_mapping(&self) -> bool {
        matches!(self, Error::SchemaNotFound(_) | Error::UndeclaredField(_))
    }
}
