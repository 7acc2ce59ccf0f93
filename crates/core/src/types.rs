//! Identity types for records
//!
//! - RecordType: the type tag of a record (`work` or `event`)
//! - RecordId: numeric identity assigned by the storage layer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type tag of an indexable record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// An activity, mission, project or production
    Work,
    /// An event belonging (optionally) to a parent work
    Event,
}

impl RecordType {
    /// All record types with a built-in schema
    pub const ALL: [RecordType; 2] = [RecordType::Work, RecordType::Event];

    /// The tag used in documents and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Work => "work",
            RecordType::Event => "event",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "work" => Ok(RecordType::Work),
            "event" => Ok(RecordType::Event),
            other => Err(Error::SchemaNotFound(other.to_string())),
        }
    }
}

/// Numeric record identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Raw id value
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
