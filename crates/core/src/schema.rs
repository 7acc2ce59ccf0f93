//! Field schema model
//!
//! Describes the fields of each record type: name, value kind, cardinality,
//! sub-fields and the lookup table that supplies type codes.
//!
//! The built-in catalogue (work and event) is built once per process and is
//! read-only afterwards. Lookups are pure.

use crate::error::{Error, Result};
use crate::types::RecordType;
use crate::value::{FieldValue, Scalar};
use once_cell::sync::Lazy;

/// Kind of scalar held by a scalar or typed-value field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Free text
    Text,
    /// Date-time
    Date,
    /// Decimal number
    Decimal,
    /// Integer
    Integer,
    /// URL
    Url,
}

impl ScalarKind {
    /// True when `scalar` has this kind
    pub fn matches(&self, scalar: &Scalar) -> bool {
        matches!(
            (self, scalar),
            (ScalarKind::Text, Scalar::Text(_))
                | (ScalarKind::Date, Scalar::Date(_))
                | (ScalarKind::Decimal, Scalar::Decimal(_))
                | (ScalarKind::Integer, Scalar::Integer(_))
                | (ScalarKind::Url, Scalar::Url(_))
        )
    }
}

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain scalar
    Scalar(ScalarKind),
    /// `{type, value}` with a scalar value
    TypedValue(ScalarKind),
    /// `{type, term}` with a list of terms
    Topic,
    /// `{type, value}` where value is a record id
    TypedRelation,
    /// `{start, end}`
    DateInterval,
}

impl FieldKind {
    /// True when `value` is an acceptable value for a field of this kind
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldKind::Scalar(kind), FieldValue::Scalar(s)) => kind.matches(s),
            (FieldKind::TypedValue(kind), FieldValue::Typed(v)) => kind.matches(&v.value),
            (FieldKind::Topic, FieldValue::Topic(_)) => true,
            (FieldKind::TypedRelation, FieldValue::Relation(_)) => true,
            (FieldKind::DateInterval, FieldValue::Interval(_)) => true,
            _ => false,
        }
    }
}

/// Descriptor of one record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name, also the base key in index documents
    pub name: String,
    /// Value kind
    pub kind: FieldKind,
    /// Whether the field holds more than one value
    pub repeatable: bool,
    /// Names of the sub-fields of a structured value, in input order
    pub sub_fields: Vec<String>,
    /// Table supplying the codes of the `type` sub-field
    pub lookup_table: Option<String>,
    /// Type code that does not get its own derived key
    pub default_type: Option<String>,
}

impl FieldSchema {
    fn new(name: &str, kind: FieldKind, repeatable: bool) -> Self {
        FieldSchema {
            name: name.to_string(),
            kind,
            repeatable,
            sub_fields: Vec::new(),
            lookup_table: None,
            default_type: None,
        }
    }

    /// Repeatable `{type, <value_key>}` field
    fn typed(name: &str, kind: FieldKind, value_key: &str, table: &str) -> Self {
        FieldSchema {
            sub_fields: vec!["type".to_string(), value_key.to_string()],
            lookup_table: Some(table.to_string()),
            ..FieldSchema::new(name, kind, true)
        }
    }

    /// Name of the sub-field carrying the value (`value`, `url`, `term`...)
    pub fn value_key(&self) -> &str {
        self.sub_fields
            .iter()
            .map(String::as_str)
            .find(|s| *s != "type")
            .unwrap_or("value")
    }

    /// True when a value with this type code gets a derived key
    pub fn has_derived_key(&self, type_code: &str) -> bool {
        !type_code.is_empty() && self.default_type.as_deref() != Some(type_code)
    }
}

/// Ordered field descriptors of one record type
///
/// Unused fields are names stored data may still carry but that the record
/// type no longer uses; ingestion ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    record_type: RecordType,
    fields: Vec<FieldSchema>,
    unused: Vec<String>,
}

impl RecordSchema {
    /// Schema from explicit descriptors
    pub fn new(record_type: RecordType, fields: Vec<FieldSchema>) -> Self {
        RecordSchema {
            record_type,
            fields,
            unused: Vec::new(),
        }
    }

    /// Builder-style: names that ingestion ignores
    pub fn with_unused<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.unused.extend(names.into_iter().map(str::to_string));
        self
    }

    /// True for a field stored data may carry but this type ignores
    pub fn is_unused(&self, name: &str) -> bool {
        self.unused.iter().any(|u| u == name)
    }

    /// Record type described by this schema
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Field descriptors in declaration order
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Descriptor of a field
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when the schema declares `name`
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Lookup table listing the vocabularies of the `topic` field
    pub fn topic_vocabulary_table(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Topic)
            .and_then(|f| f.lookup_table.as_deref())
    }
}

fn work_fields() -> Vec<FieldSchema> {
    use FieldKind::*;
    let text = TypedValue(ScalarKind::Text);
    vec![
        FieldSchema::typed("name", text, "value", "table:name-type"),
        FieldSchema::typed("content", text, "value", "table:content-type"),
        FieldSchema::typed("topic", Topic, "term", "table:topic-type"),
        FieldSchema::typed("link", TypedValue(ScalarKind::Url), "url", "table:link-type"),
        FieldSchema::typed("organization", TypedRelation, "value", "table:org-org-relation"),
        FieldSchema::typed("person", TypedRelation, "value", "table:org-person-relation"),
        FieldSchema::typed("number", text, "value", "table:number-type"),
        FieldSchema::typed("date", TypedValue(ScalarKind::Date), "value", "table:date-type"),
        FieldSchema::typed("figure", TypedValue(ScalarKind::Decimal), "value", "table:figure-type"),
    ]
}

fn event_fields() -> Vec<FieldSchema> {
    let mut fields = vec![
        FieldSchema::new("work", FieldKind::TypedRelation, false),
        FieldSchema {
            sub_fields: vec!["start".to_string(), "end".to_string()],
            ..FieldSchema::new("startend", FieldKind::DateInterval, true)
        },
        FieldSchema::typed(
            "place",
            FieldKind::TypedRelation,
            "value",
            "table:event-place-relation",
        ),
        FieldSchema::typed(
            "event",
            FieldKind::TypedRelation,
            "value",
            "table:event-event-relation",
        ),
    ];
    // Events inherit the work fields, except `date` which they do not use.
    fields.extend(work_fields().into_iter().filter(|f| f.name != "date"));
    fields
}

static CATALOGUE: Lazy<Vec<RecordSchema>> = Lazy::new(|| {
    vec![
        RecordSchema::new(RecordType::Work, work_fields()),
        RecordSchema::new(RecordType::Event, event_fields()).with_unused(["date"]),
    ]
});

/// Built-in schema of a record type
pub fn schema_for(record_type: RecordType) -> Result<&'static RecordSchema> {
    CATALOGUE
        .iter()
        .find(|s| s.record_type == record_type)
        .ok_or_else(|| Error::SchemaNotFound(record_type.to_string()))
}

/// Built-in schema looked up by type tag
pub fn schema_named(tag: &str) -> Result<&'static RecordSchema> {
    schema_for(tag.parse()?)
}
