//! Records: the input of the mapping pipeline
//!
//! A record has a type tag, a numeric identity and, per field, an ordered
//! list of values. Records are supplied by the storage layer and never
//! modified by the mapper.
//!
//! Records can be built programmatically or ingested from their stored JSON
//! form. [`Record::from_json`] validates every value against the field
//! schema; [`Record::from_json_lenient`] drops what does not parse.

use crate::error::{Error, Result};
use crate::schema::{FieldKind, FieldSchema, RecordSchema, ScalarKind};
use crate::types::{RecordId, RecordType};
use crate::value::{
    parse_datetime, DateInterval, FieldValue, Scalar, TopicValue, TypedRelation, TypedValue,
};
use chrono::FixedOffset;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::debug;

/// Field renamed in stored data: `figures` became `figure`
const LEGACY_FIGURES: &str = "figures";

/// A typed record with its field values
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: RecordType,
    id: RecordId,
    fields: BTreeMap<String, Vec<FieldValue>>,
}

impl Record {
    /// Empty record
    pub fn new(record_type: RecordType, id: u64) -> Self {
        Record {
            record_type,
            id: RecordId(id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style: append values to a field
    pub fn with(mut self, field: &str, values: impl IntoIterator<Item = FieldValue>) -> Self {
        self.push(field, values);
        self
    }

    /// Append values to a field
    pub fn push(&mut self, field: &str, values: impl IntoIterator<Item = FieldValue>) {
        let entry = self.fields.entry(field.to_string()).or_default();
        entry.extend(values);
        if entry.is_empty() {
            self.fields.remove(field);
        }
    }

    /// Replace the values of a field (an empty list removes it)
    pub fn set(&mut self, field: &str, values: Vec<FieldValue>) {
        if values.is_empty() {
            self.fields.remove(field);
        } else {
            self.fields.insert(field.to_string(), values);
        }
    }

    /// Record type tag
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Record identity
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Values of a field; empty when the field is absent
    pub fn values(&self, field: &str) -> &[FieldValue] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when the field holds at least one value
    pub fn has(&self, field: &str) -> bool {
        !self.values(field).is_empty()
    }

    /// Names of the fields holding values
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Relations held by a field
    pub fn relations<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a TypedRelation> + 'a {
        self.values(field).iter().filter_map(|v| match v {
            FieldValue::Relation(r) => Some(r),
            _ => None,
        })
    }

    /// Target of the first relation of a field
    pub fn first_relation(&self, field: &str) -> Option<RecordId> {
        self.relations(field).next().map(|r| r.target)
    }

    /// Topic values of the `topic` field
    pub fn topics(&self) -> impl Iterator<Item = &TopicValue> {
        self.values("topic").iter().filter_map(|v| match v {
            FieldValue::Topic(t) => Some(t),
            _ => None,
        })
    }

    /// Intervals held by a field
    pub fn intervals<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a DateInterval> + 'a {
        self.values(field).iter().filter_map(|v| match v {
            FieldValue::Interval(i) => Some(i),
            _ => None,
        })
    }

    /// Text of the first non-empty value of a field
    pub fn first_text(&self, field: &str) -> Option<String> {
        self.values(field).iter().find_map(|v| {
            let text = match v {
                FieldValue::Scalar(s) => s.to_text(),
                FieldValue::Typed(t) => t.value.to_text(),
                _ => return None,
            };
            (!text.is_empty()).then_some(text)
        })
    }

    /// Check every value against the schema
    ///
    /// # Errors
    ///
    /// - `SchemaNotFound` if `schema` describes another record type
    /// - `UnknownField` for a field the schema does not declare
    /// - `InvalidFieldValue` for a cardinality or kind mismatch
    pub fn validate(&self, schema: &RecordSchema) -> Result<()> {
        if schema.record_type() != self.record_type {
            return Err(Error::SchemaNotFound(self.record_type.to_string()));
        }
        for (name, values) in &self.fields {
            let field = schema.field(name).ok_or_else(|| Error::UnknownField {
                record_type: self.record_type.to_string(),
                field: name.clone(),
            })?;
            if !field.repeatable && values.len() > 1 {
                return Err(Error::invalid_value(
                    name.as_str(),
                    format!("field is not repeatable but holds {} values", values.len()),
                ));
            }
            if let Some(bad) = values.iter().find(|v| !field.kind.accepts(v)) {
                return Err(Error::invalid_value(
                    name.as_str(),
                    format!("{:?} does not match kind {:?}", bad, field.kind),
                ));
            }
        }
        Ok(())
    }

    /// Ingest a record from its stored JSON form, validating every value
    ///
    /// `data` is an object keyed by field name. Repeatable fields hold an
    /// array of entries, single fields one entry. Null entries are skipped.
    /// The legacy `figures` key is read as `figure`, and fields the schema
    /// marks unused are ignored. Dates without an offset are placed in
    /// `default_offset`.
    ///
    /// # Errors
    ///
    /// - `UnknownField` for a field the schema does not declare
    /// - `InvalidFieldValue` for an entry that does not parse
    ///
    /// # Example
    ///
    /// ```
    /// use activity_core::{schema_for, Record, RecordType};
    /// use chrono::FixedOffset;
    /// use serde_json::json;
    ///
    /// let schema = schema_for(RecordType::Event).unwrap();
    /// let data = json!({
    ///     "work": 12,
    ///     "name": [{"type": "usual", "value": "Spring festival"}],
    ///     "startend": [{"start": "2020-03-10", "end": "2020-03-12"}],
    /// });
    /// let utc = FixedOffset::east_opt(0).unwrap();
    /// let record = Record::from_json(schema, 40, &data, utc).unwrap();
    /// assert_eq!(record.first_relation("work").map(|id| id.get()), Some(12));
    /// ```
    pub fn from_json(
        schema: &RecordSchema,
        id: u64,
        data: &JsonValue,
        default_offset: FixedOffset,
    ) -> Result<Self> {
        Ingest {
            schema,
            id,
            offset: default_offset,
            mode: Mode::Strict,
        }
        .record(data)
    }

    /// Ingest a record from its stored JSON form, dropping what does not parse
    ///
    /// Same input as [`Record::from_json`], but irregular data degrades
    /// instead of failing: undeclared fields, entries that do not parse and
    /// extra entries of a single field are dropped and logged at debug
    /// level. A date bound that does not parse is read as missing, so an
    /// interval whose start does not parse is kept as a malformed interval.
    ///
    /// # Errors
    ///
    /// Only errors that are fatal to mapping are returned; ingestion itself
    /// produces none.
    pub fn from_json_lenient(
        schema: &RecordSchema,
        id: u64,
        data: &JsonValue,
        default_offset: FixedOffset,
    ) -> Result<Self> {
        Ingest {
            schema,
            id,
            offset: default_offset,
            mode: Mode::Lenient,
        }
        .record(data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Lenient,
}

/// One ingestion pass over a stored record
struct Ingest<'a> {
    schema: &'a RecordSchema,
    id: u64,
    offset: FixedOffset,
    mode: Mode,
}

impl Ingest<'_> {
    fn record(&self, data: &JsonValue) -> Result<Record> {
        let mut record = Record::new(self.schema.record_type(), self.id);
        let object = match data.as_object() {
            Some(object) => rename_legacy_fields(object),
            None => {
                let err =
                    Error::invalid_value("<record>", "expected an object keyed by field name");
                self.tolerate(err)?;
                return Ok(record);
            }
        };

        for (name, raw) in &object {
            if self.schema.is_unused(name) {
                debug!(target: "activity::record", field = %name, "Unused field ignored");
                continue;
            }
            let Some(field) = self.schema.field(name) else {
                self.tolerate(Error::UnknownField {
                    record_type: self.schema.record_type().to_string(),
                    field: name.clone(),
                })?;
                continue;
            };
            let mut entries: Vec<&JsonValue> = match raw {
                JsonValue::Null => Vec::new(),
                JsonValue::Array(items) => items.iter().filter(|e| !e.is_null()).collect(),
                single => vec![single],
            };
            if !field.repeatable && raw.is_array() {
                if entries.len() > 1 {
                    self.tolerate(Error::invalid_value(name.as_str(), "field is not repeatable"))?;
                }
                entries.truncate(1);
            }

            let mut values = Vec::with_capacity(entries.len());
            for entry in entries {
                match self.entry(field, entry) {
                    Ok(value) => values.push(value),
                    Err(err) => self.tolerate(err)?,
                }
            }
            record.set(name, values);
        }
        Ok(record)
    }

    /// Fail in strict mode; in lenient mode log and carry on unless fatal
    fn tolerate(&self, err: Error) -> Result<()> {
        if self.mode == Mode::Strict || err.is_fatal_to_mapping() {
            return Err(err);
        }
        debug!(
            target: "activity::record",
            record_type = %self.schema.record_type(),
            record_id = self.id,
            error = %err,
            "Irregular stored data dropped"
        );
        Ok(())
    }

    fn entry(&self, field: &FieldSchema, entry: &JsonValue) -> Result<FieldValue> {
        let name = field.name.as_str();
        let offset = self.offset;
        match field.kind {
            FieldKind::Scalar(kind) => {
                Ok(FieldValue::Scalar(parse_scalar(name, kind, entry, offset)?))
            }
            FieldKind::TypedValue(kind) => {
                let raw = member(entry, field.value_key())
                    .ok_or_else(|| Error::invalid_value(name, "missing value"))?;
                Ok(FieldValue::Typed(TypedValue {
                    value_type: type_code(name, entry)?,
                    value: parse_scalar(name, kind, raw, offset)?,
                }))
            }
            FieldKind::Topic => {
                let topic_type = type_code(name, entry)?.ok_or_else(|| {
                    Error::invalid_value(name, "topic without a vocabulary type")
                })?;
                Ok(FieldValue::Topic(TopicValue {
                    topic_type,
                    terms: topic_terms(name, member(entry, field.value_key()))?,
                }))
            }
            FieldKind::TypedRelation => {
                let (relation_type, raw) = if entry.is_object() {
                    let raw = member(entry, field.value_key())
                        .ok_or_else(|| Error::invalid_value(name, "missing related record id"))?;
                    (type_code(name, entry)?, raw)
                } else {
                    (None, entry)
                };
                Ok(FieldValue::Relation(TypedRelation {
                    relation_type,
                    target: parse_record_id(name, raw)?,
                }))
            }
            FieldKind::DateInterval => Ok(FieldValue::Interval(DateInterval {
                start: self.bound(name, entry, "start")?,
                end: self.bound(name, entry, "end")?,
            })),
        }
    }

    /// One bound of an interval; unparseable bounds read as missing when lenient
    fn bound(&self, field: &str, entry: &JsonValue, key: &str) -> Result<Option<DateTime>> {
        let parsed = match member(entry, key) {
            None | Some(JsonValue::Null) => return Ok(None),
            Some(JsonValue::String(s)) if s.is_empty() => return Ok(None),
            Some(JsonValue::String(s)) => parse_datetime(s, self.offset)
                .map_err(|e| Error::invalid_value(field, e.to_string())),
            Some(other) => Err(Error::invalid_value(field, format!("unexpected date {}", other))),
        };
        match parsed {
            Ok(date) => Ok(Some(date)),
            Err(err) => self.tolerate(err).map(|()| None),
        }
    }
}

type DateTime = chrono::DateTime<FixedOffset>;

fn rename_legacy_fields(object: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut object = object.clone();
    if let Some(figures) = object.remove(LEGACY_FIGURES) {
        debug!(target: "activity::record", "Reading legacy 'figures' field as 'figure'");
        object.insert("figure".to_string(), figures);
    }
    object
}

fn member<'a>(entry: &'a JsonValue, key: &str) -> Option<&'a JsonValue> {
    entry.as_object().and_then(|o| o.get(key))
}

fn type_code(field: &str, entry: &JsonValue) -> Result<Option<String>> {
    match member(entry, "type") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.is_empty() => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid_value(
            field,
            format!("type must be a string, got {}", other),
        )),
    }
}

fn topic_terms(field: &str, raw: Option<&JsonValue>) -> Result<Vec<String>> {
    match raw {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(term)) => Ok(vec![term.clone()]),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|t| {
                t.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::invalid_value(field, "topic terms must be strings"))
            })
            .collect(),
        Some(other) => Err(Error::invalid_value(field, format!("unexpected terms {}", other))),
    }
}

fn parse_record_id(field: &str, raw: &JsonValue) -> Result<RecordId> {
    let id = match raw {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.map(RecordId)
        .ok_or_else(|| Error::invalid_value(field, format!("expected a record id, got {}", raw)))
}

fn parse_scalar(
    field: &str,
    kind: ScalarKind,
    raw: &JsonValue,
    offset: FixedOffset,
) -> Result<Scalar> {
    let mismatch = || Error::invalid_value(field, format!("expected {:?}, got {}", kind, raw));
    match kind {
        ScalarKind::Text => raw
            .as_str()
            .map(|s| Scalar::Text(s.to_string()))
            .ok_or_else(mismatch),
        ScalarKind::Url => raw
            .as_str()
            .map(|s| Scalar::Url(s.to_string()))
            .ok_or_else(mismatch),
        ScalarKind::Integer => match raw {
            JsonValue::Number(n) => n.as_i64().map(Scalar::Integer).ok_or_else(mismatch),
            JsonValue::String(s) => s.trim().parse().map(Scalar::Integer).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ScalarKind::Decimal => match raw {
            JsonValue::Number(n) => n.as_f64().map(Scalar::Decimal).ok_or_else(mismatch),
            JsonValue::String(s) => s.trim().parse().map(Scalar::Decimal).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ScalarKind::Date => {
            let s = raw.as_str().ok_or_else(mismatch)?;
            parse_datetime(s, offset)
                .map(Scalar::Date)
                .map_err(|e| Error::invalid_value(field, e.to_string()))
        }
    }
}
