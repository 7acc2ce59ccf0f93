//! Index documents
//!
//! This module provides:
//! - DocScalar: an output scalar (integer, decimal, text)
//! - FieldData: single value, dense list or dense list of nested objects
//! - IndexDocument: ordered map from flattened key to field data
//! - Order-preserving deduplication helpers
//!
//! # Dense lists
//!
//! Lists are plain `Vec`s and always serialize as JSON arrays. Search
//! engines read a sparse or keyed list as an object, so there is no way to
//! build a list with holes in it.

use activity_core::{format_datetime, Scalar};
use indexmap::IndexSet;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Output scalar
///
/// Decimals compare and hash by bit pattern, so every scalar can sit in a
/// set.
#[derive(Debug, Clone)]
pub enum DocScalar {
    /// Integer (record ids, counts)
    Integer(i64),
    /// Decimal
    Decimal(f64),
    /// Text (dates are rendered as RFC 3339 text)
    Text(String),
}

impl DocScalar {
    /// Text value
    pub fn text(s: impl Into<String>) -> Self {
        DocScalar::Text(s.into())
    }

    /// Borrow the text of a `Text` scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocScalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of an `Integer` scalar
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DocScalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            DocScalar::Integer(i) => JsonValue::from(*i),
            DocScalar::Decimal(d) => Number::from_f64(*d)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DocScalar::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl PartialEq for DocScalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DocScalar::Integer(a), DocScalar::Integer(b)) => a == b,
            (DocScalar::Decimal(a), DocScalar::Decimal(b)) => a.to_bits() == b.to_bits(),
            (DocScalar::Text(a), DocScalar::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DocScalar {}

impl Hash for DocScalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DocScalar::Integer(i) => i.hash(state),
            DocScalar::Decimal(d) => d.to_bits().hash(state),
            DocScalar::Text(s) => s.hash(state),
        }
    }
}

impl From<&Scalar> for DocScalar {
    fn from(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::Text(s) | Scalar::Url(s) => DocScalar::Text(s.clone()),
            Scalar::Integer(i) => DocScalar::Integer(*i),
            Scalar::Decimal(d) => DocScalar::Decimal(*d),
            Scalar::Date(d) => DocScalar::Text(format_datetime(d)),
        }
    }
}

/// Value stored under one document key
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// One value
    Single(DocScalar),
    /// Dense list of values
    List(Vec<DocScalar>),
    /// Dense list of nested objects
    Nested(Vec<BTreeMap<String, DocScalar>>),
}

impl FieldData {
    /// Values as a slice (a single value is a one-element slice)
    pub fn values(&self) -> &[DocScalar] {
        match self {
            FieldData::Single(v) => std::slice::from_ref(v),
            FieldData::List(v) => v,
            FieldData::Nested(_) => &[],
        }
    }

    /// Number of values or nested objects
    pub fn len(&self) -> usize {
        match self {
            FieldData::Single(_) => 1,
            FieldData::List(v) => v.len(),
            FieldData::Nested(v) => v.len(),
        }
    }

    /// True for an empty list
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_json(&self) -> JsonValue {
        match self {
            FieldData::Single(v) => v.to_json(),
            FieldData::List(v) => JsonValue::Array(v.iter().map(DocScalar::to_json).collect()),
            FieldData::Nested(v) => JsonValue::Array(
                v.iter()
                    .map(|obj| {
                        JsonValue::Object(
                            obj.iter()
                                .map(|(k, s)| (k.clone(), s.to_json()))
                                .collect::<Map<_, _>>(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

/// Flattened document handed to the index writer
///
/// Keys are kept sorted so that serializing the same document always
/// yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexDocument {
    fields: BTreeMap<String, FieldData>,
}

impl IndexDocument {
    /// Empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the list stored under `key`
    ///
    /// A single value already stored under `key` becomes the first element
    /// of the list.
    pub fn append(&mut self, key: &str, value: DocScalar) {
        match self.fields.remove(key) {
            None => {
                self.fields.insert(key.to_string(), FieldData::List(vec![value]));
            }
            Some(FieldData::List(mut list)) => {
                list.push(value);
                self.fields.insert(key.to_string(), FieldData::List(list));
            }
            Some(FieldData::Single(first)) => {
                self.fields
                    .insert(key.to_string(), FieldData::List(vec![first, value]));
            }
            Some(FieldData::Nested(nested)) => {
                // Scalars never mix with nested objects; keep the nested data.
                self.fields.insert(key.to_string(), FieldData::Nested(nested));
            }
        }
    }

    /// Store a single value
    pub fn set_single(&mut self, key: &str, value: DocScalar) {
        self.fields.insert(key.to_string(), FieldData::Single(value));
    }

    /// Store a list; an empty list removes the key
    pub fn set_list(&mut self, key: &str, values: Vec<DocScalar>) {
        if values.is_empty() {
            self.fields.remove(key);
        } else {
            self.fields.insert(key.to_string(), FieldData::List(values));
        }
    }

    /// Store a list of nested objects; an empty list removes the key
    pub fn set_nested(&mut self, key: &str, objects: Vec<BTreeMap<String, DocScalar>>) {
        if objects.is_empty() {
            self.fields.remove(key);
        } else {
            self.fields.insert(key.to_string(), FieldData::Nested(objects));
        }
    }

    /// Store field data as is
    pub fn set(&mut self, key: &str, data: FieldData) {
        self.fields.insert(key.to_string(), data);
    }

    /// Data stored under `key`
    pub fn get(&self, key: &str) -> Option<&FieldData> {
        self.fields.get(key)
    }

    /// Values stored under `key` (empty when absent or nested)
    pub fn values(&self, key: &str) -> &[DocScalar] {
        self.fields.get(key).map(FieldData::values).unwrap_or(&[])
    }

    /// Text values stored under `key`
    pub fn texts(&self, key: &str) -> Vec<&str> {
        self.values(key).iter().filter_map(DocScalar::as_str).collect()
    }

    /// Integer values stored under `key`
    pub fn integers(&self, key: &str) -> Vec<i64> {
        self.values(key).iter().filter_map(DocScalar::as_i64).collect()
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<FieldData> {
        self.fields.remove(key)
    }

    /// True when `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldData)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the document has no key
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object for the index writer
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<_, _>>(),
        )
    }

    /// Compact JSON text for the index writer
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Keep the first occurrence of every string, in order
///
/// # Example
///
/// ```
/// use activity_search::document::dedup_in_order;
///
/// let unique = dedup_in_order(vec!["a".to_string(), "b".into(), "a".into()]);
/// assert_eq!(unique, vec!["a", "b"]);
/// ```
pub fn dedup_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// `first` then `then`, keeping the first occurrence of every value
pub fn merge_unique(first: &[DocScalar], then: &[DocScalar]) -> Vec<DocScalar> {
    let merged: IndexSet<&DocScalar> = first.iter().chain(then).collect();
    merged.into_iter().cloned().collect()
}

/// `first` then `then`, every value kept
pub fn append_all(first: &[DocScalar], then: &[DocScalar]) -> Vec<DocScalar> {
    first.iter().chain(then).cloned().collect()
}

/// Wrap strings as text scalars
pub fn texts(items: impl IntoIterator<Item = String>) -> Vec<DocScalar> {
    items.into_iter().map(DocScalar::Text).collect()
}
