//! Index schema builder
//!
//! This module provides:
//! - IndexType: how the search engine indexes a field
//! - DynamicTemplate: wildcard rule for type-qualified derived keys
//! - MappingBuilder: accumulates field declarations for one record type
//! - IndexSchema: the immutable result, with document conformance checks
//! - The work and event mappings
//!
//! # Dynamic templates
//!
//! A typed value is indexed under its base field and under `base-type`
//! (`name-acronym`, `place-venue`...). The set of type codes is open, so the
//! schema declares a `base-*` template that gives every derived key the
//! index type of `base` and copies its data into `base`.

use crate::document::IndexDocument;
use crate::thesaurus::ThesaurusTopic;
use activity_core::{Error, RecordType, Result};
use indexmap::IndexMap;
use serde_json::{json, Map, Value as JsonValue};

// ============================================================================
// Field names shared with the mapper
// ============================================================================

/// Record type tag
pub const TYPE: &str = "type";
/// Generated title
pub const POST_TITLE: &str = "posttitle";
/// Parent work of an event
pub const WORK: &str = "work";
/// Event date intervals
pub const STARTEND: &str = "startend";
/// Earliest start of an event
pub const START_DATE: &str = "startdate";
/// Latest end of an event
pub const END_DATE: &str = "enddate";
/// Year of the earliest start
pub const START_DATE_HIERARCHY: &str = "startdate-hierarchy";
/// Places of an event
pub const PLACE: &str = "place";
/// `continent/country` of the places of an event
pub const GEOLOC_HIERARCHY: &str = "geoloc-hierarchy";

/// Key holding the hierarchy paths of one topic vocabulary
pub fn topic_hierarchy_key(topic: &str) -> String {
    format!("topic-{}-hierarchy", topic)
}

// ============================================================================
// IndexType
// ============================================================================

/// How the search engine indexes a field
#[derive(Debug, Clone, PartialEq)]
pub enum IndexType {
    /// 64-bit integer (record ids)
    Integer,
    /// Full text, optionally with a filter sub-field and suggestions
    Text {
        /// Add a completion suggester
        suggest: bool,
        /// Add an exact-match sub-field for filters and facets
        filter: bool,
    },
    /// Exact-match keyword
    Literal,
    /// Decimal number
    Decimal,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
    /// URL
    Url,
    /// Nested objects with their own properties
    Nested(Vec<FieldMapping>),
    /// Hierarchical path, one level per value
    Hierarchy,
}

impl IndexType {
    /// Plain full text
    pub fn text() -> Self {
        IndexType::Text {
            suggest: false,
            filter: false,
        }
    }

    /// Add suggestions to a text type (no effect on other types)
    pub fn suggest(self) -> Self {
        match self {
            IndexType::Text { filter, .. } => IndexType::Text {
                suggest: true,
                filter,
            },
            other => other,
        }
    }

    /// Add a filter sub-field to a text type (no effect on other types)
    pub fn filter(self) -> Self {
        match self {
            IndexType::Text { suggest, .. } => IndexType::Text {
                suggest,
                filter: true,
            },
            other => other,
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            IndexType::Integer => json!({"type": "long"}),
            IndexType::Text { suggest, filter } => {
                let mut mapping = json!({"type": "text"});
                let mut fields = Map::new();
                if *filter {
                    fields.insert("filter".to_string(), json!({"type": "keyword"}));
                }
                if *suggest {
                    fields.insert("suggest".to_string(), json!({"type": "completion"}));
                }
                if !fields.is_empty() {
                    mapping["fields"] = JsonValue::Object(fields);
                }
                mapping
            }
            IndexType::Literal => json!({"type": "keyword"}),
            IndexType::Decimal => json!({"type": "double"}),
            IndexType::Date => json!({"type": "date"}),
            IndexType::DateTime => json!({"type": "date", "format": "date_time_no_millis"}),
            IndexType::Url => json!({"type": "keyword", "ignore_above": 2048}),
            IndexType::Nested(properties) => json!({
                "type": "nested",
                "properties": properties_json(properties.iter()),
            }),
            IndexType::Hierarchy => json!({
                "type": "keyword",
                "fields": {"hierarchy": {"type": "text", "analyzer": "hierarchy"}},
            }),
        }
    }
}

// ============================================================================
// DynamicTemplate / FieldMapping
// ============================================================================

/// Wildcard rule for derived keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicTemplate {
    /// Key pattern, `*` matching any run of characters
    pub pattern: String,
    /// Field whose index type matched keys get
    pub copy_from: String,
    /// Field that receives a copy of the matched data
    pub copy_data_to: String,
}

impl DynamicTemplate {
    /// True when `key` matches the pattern
    pub fn matches(&self, key: &str) -> bool {
        wildcard_match(&self.pattern, key)
    }
}

/// Declaration of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Key in the index document
    pub name: String,
    /// Index type
    pub index_type: IndexType,
    /// Templates attached to this field
    pub templates: Vec<DynamicTemplate>,
}

impl FieldMapping {
    /// Attach a dynamic template
    pub fn template(&mut self, pattern: &str, copy_from: &str, copy_data_to: &str) -> &mut Self {
        self.templates.push(DynamicTemplate {
            pattern: pattern.to_string(),
            copy_from: copy_from.to_string(),
            copy_data_to: copy_data_to.to_string(),
        });
        self
    }

    /// Attach the `name-*` style template: derived keys copy from and into this field
    pub fn typed_template(&mut self) -> &mut Self {
        let pattern = format!("{}-*", self.name);
        let name = self.name.clone();
        self.template(&pattern, &name, &name)
    }
}

// ============================================================================
// MappingBuilder
// ============================================================================

/// Accumulates field declarations
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    fields: IndexMap<String, FieldMapping>,
}

impl MappingBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field
    ///
    /// Re-declaring a name replaces the previous declaration (templates
    /// included) and keeps its position.
    pub fn add_field(&mut self, name: &str, index_type: IndexType) -> &mut FieldMapping {
        let mapping = FieldMapping {
            name: name.to_string(),
            index_type,
            templates: Vec::new(),
        };
        let (index, _) = self.fields.insert_full(name.to_string(), mapping);
        &mut self.fields[index]
    }

    /// Declare a nested field whose properties are declared by `properties`
    pub fn add_nested(
        &mut self,
        name: &str,
        properties: impl FnOnce(&mut MappingBuilder),
    ) -> &mut FieldMapping {
        let mut nested = MappingBuilder::new();
        properties(&mut nested);
        self.add_field(name, IndexType::Nested(nested.fields.into_values().collect()))
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the schema (the builder is left untouched)
    pub fn build(&self, record_type: RecordType) -> IndexSchema {
        IndexSchema {
            record_type,
            fields: self.fields.clone(),
        }
    }
}

// ============================================================================
// IndexSchema
// ============================================================================

/// Immutable index schema of one record type
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    record_type: RecordType,
    fields: IndexMap<String, FieldMapping>,
}

impl IndexSchema {
    /// Record type described
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Declared fields keyed by name, in declaration order
    pub fn fields(&self) -> &IndexMap<String, FieldMapping> {
        &self.fields
    }

    /// Declaration of a field
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }

    /// All dynamic templates, in declaration order
    pub fn templates(&self) -> impl Iterator<Item = &DynamicTemplate> {
        self.fields.values().flat_map(|f| f.templates.iter())
    }

    /// Template matching `key`, if any
    pub fn template_for(&self, key: &str) -> Option<&DynamicTemplate> {
        self.templates().find(|t| t.matches(key))
    }

    /// True when `key` is declared, exactly or through a template
    pub fn accepts(&self, key: &str) -> bool {
        self.field(key).is_some() || self.template_for(key).is_some()
    }

    /// Index type a key gets: its own, or the one its template copies from
    pub fn index_type_of(&self, key: &str) -> Option<&IndexType> {
        if let Some(field) = self.field(key) {
            return Some(&field.index_type);
        }
        let template = self.template_for(key)?;
        self.field(&template.copy_from).map(|f| &f.index_type)
    }

    /// Check that every key of a document is declared
    ///
    /// # Errors
    ///
    /// Returns `UndeclaredField` for the first key (in key order) the
    /// schema does not accept.
    pub fn check(&self, document: &IndexDocument) -> Result<()> {
        match document.keys().find(|k| !self.accepts(k)) {
            Some(key) => Err(Error::UndeclaredField(key.to_string())),
            None => Ok(()),
        }
    }

    /// Engine mapping: `properties` plus `dynamic_templates`
    pub fn to_json(&self) -> JsonValue {
        let templates: Vec<JsonValue> = self
            .templates()
            .map(|t| {
                let mut mapping = self
                    .field(&t.copy_from)
                    .map(|f| f.index_type.to_json())
                    .unwrap_or_else(|| json!({"type": "keyword"}));
                mapping["copy_to"] = JsonValue::String(t.copy_data_to.clone());
                let mut entry = Map::new();
                entry.insert(
                    t.pattern.clone(),
                    json!({"path_match": t.pattern, "mapping": mapping}),
                );
                JsonValue::Object(entry)
            })
            .collect();
        json!({
            "properties": properties_json(self.fields.values()),
            "dynamic_templates": templates,
        })
    }
}

fn properties_json<'a>(fields: impl Iterator<Item = &'a FieldMapping>) -> JsonValue {
    JsonValue::Object(
        fields
            .map(|f| (f.name.clone(), f.index_type.to_json()))
            .collect::<Map<_, _>>(),
    )
}

/// Glob match where `*` matches any run of characters (possibly empty)
fn wildcard_match(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // No wildcard: exact match.
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

// ============================================================================
// Record mappings
// ============================================================================

/// Declare the fields of a work record
pub fn build_work_mapping(mapping: &mut MappingBuilder, thesaurus_topics: &[ThesaurusTopic]) {
    mapping.add_field(TYPE, IndexType::Literal);
    mapping.add_field(POST_TITLE, IndexType::text());

    mapping
        .add_field("name", IndexType::text().suggest())
        .typed_template();
    mapping.add_field("content", IndexType::text()).typed_template();
    mapping
        .add_field("topic", IndexType::text().filter().suggest())
        .typed_template();

    // One hierarchy field per vocabulary backed by a thesaurus
    for topic in thesaurus_topics {
        mapping.add_field(&topic_hierarchy_key(&topic.topic), IndexType::Hierarchy);
    }

    mapping.add_field("link", IndexType::Url).typed_template();
    mapping.add_field("organization", IndexType::Integer).typed_template();
    mapping.add_field("person", IndexType::Integer).typed_template();
    mapping.add_field("number", IndexType::Literal).typed_template();
    mapping.add_field("date", IndexType::Date).typed_template();
    mapping.add_field("figure", IndexType::Decimal).typed_template();
}

/// Declare the fields of an event record (work fields included)
pub fn build_event_mapping(mapping: &mut MappingBuilder, thesaurus_topics: &[ThesaurusTopic]) {
    build_work_mapping(mapping, thesaurus_topics);

    mapping.add_field(WORK, IndexType::Integer);

    mapping.add_nested(STARTEND, |nested| {
        nested.add_field("start", IndexType::DateTime);
        nested.add_field("end", IndexType::DateTime);
    });
    mapping.add_field(START_DATE, IndexType::DateTime);
    mapping.add_field(START_DATE_HIERARCHY, IndexType::Hierarchy);
    mapping.add_field(END_DATE, IndexType::DateTime);

    mapping.add_field(PLACE, IndexType::Integer).typed_template();
    mapping.add_field("event", IndexType::Integer).typed_template();

    mapping.add_field(GEOLOC_HIERARCHY, IndexType::Hierarchy);
}

/// Index schema of a record type
pub fn index_schema_for(
    record_type: RecordType,
    thesaurus_topics: &[ThesaurusTopic],
) -> IndexSchema {
    let mut mapping = MappingBuilder::new();
    match record_type {
        RecordType::Work => build_work_mapping(&mut mapping, thesaurus_topics),
        RecordType::Event => build_event_mapping(&mut mapping, thesaurus_topics),
    }
    mapping.build(record_type)
}
