//! Field value types
//!
//! This module defines:
//! - Scalar: text, date-time, decimal, integer or URL
//! - FieldValue: tagged union of everything a record field can hold
//! - DateInterval: `{start, end}` pair where `end` defaults to `start`
//! - PostalAddress: address of a place, as returned by the record store
//!
//! ## Typed values
//!
//! A typed value pairs a scalar (or a list of topic terms, or a relation
//! target) with an optional type code taken from the field's lookup table.
//! The mapper indexes it under the base field and under the derived key
//! returned by [`derived_key`].

use crate::error::{Error, Result};
use crate::types::RecordId;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};

/// Scalar value held by a field or by the `value` part of a typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// UTF-8 text
    Text(String),
    /// 64-bit signed integer
    Integer(i64),
    /// Decimal number (key figures)
    Decimal(f64),
    /// Date-time with explicit offset
    Date(DateTime<FixedOffset>),
    /// URL, stored verbatim
    Url(String),
}

impl Scalar {
    /// Text form of the scalar (dates rendered as RFC 3339)
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Text(s) | Scalar::Url(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Decimal(d) => d.to_string(),
            Scalar::Date(d) => format_datetime(d),
        }
    }

    /// Borrow the text of a `Text` or `Url` scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) | Scalar::Url(s) => Some(s),
            _ => None,
        }
    }

    /// True for empty text and URLs
    pub fn is_empty(&self) -> bool {
        matches!(self.as_str(), Some(s) if s.is_empty())
    }
}

/// `{type, value}` pair where value is a scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    /// Type code (e.g. `acronym`), from the field's lookup table
    pub value_type: Option<String>,
    /// The value itself
    pub value: Scalar,
}

/// `{type, term}` pair: terms drawn from the vocabulary named by `topic_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicValue {
    /// Vocabulary code (e.g. `subject`, `free`)
    pub topic_type: String,
    /// Terms, in entry order
    pub terms: Vec<String>,
}

/// `{type, value}` pair where value is the identity of another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRelation {
    /// Relation type code (None for untyped relations such as `work`)
    pub relation_type: Option<String>,
    /// Target record
    pub target: RecordId,
}

/// Date-time interval
///
/// `start` is optional because stored data may lack it; such an interval is
/// malformed and contributes nothing to date aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    /// Start of the interval
    pub start: Option<DateTime<FixedOffset>>,
    /// End of the interval, defaults to `start`
    pub end: Option<DateTime<FixedOffset>>,
}

impl DateInterval {
    /// Interval with both bounds
    pub fn new(start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>>) -> Self {
        DateInterval {
            start: Some(start),
            end,
        }
    }

    /// Start and effective end, or None when the interval has no start
    pub fn bounds(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let start = self.start?;
        Some((start, self.end.unwrap_or(start)))
    }

    /// True when the interval cannot contribute to aggregation
    pub fn is_malformed(&self) -> bool {
        self.start.is_none()
    }

    /// Earliest start and latest effective end of a set of intervals
    ///
    /// Malformed intervals are ignored. Returns None when no interval has a
    /// start.
    pub fn span<'a>(
        intervals: impl IntoIterator<Item = &'a DateInterval>,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        intervals
            .into_iter()
            .filter_map(DateInterval::bounds)
            .fold(None, |acc, (start, end)| match acc {
                None => Some((start, end)),
                Some((lo, hi)) => Some((lo.min(start), hi.max(end))),
            })
    }
}

/// Tagged union of everything a record field can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Plain scalar
    Scalar(Scalar),
    /// Typed scalar (name, content, link, number, date, figure)
    Typed(TypedValue),
    /// Typed list of terms (topic)
    Topic(TopicValue),
    /// Relation to another record, typed or not
    Relation(TypedRelation),
    /// Date interval (event start/end)
    Interval(DateInterval),
}

impl FieldValue {
    /// Typed text value
    pub fn typed_text(value_type: &str, value: &str) -> Self {
        FieldValue::Typed(TypedValue {
            value_type: non_empty(value_type),
            value: Scalar::Text(value.to_string()),
        })
    }

    /// Typed relation (empty type means untyped)
    pub fn relation(relation_type: &str, target: u64) -> Self {
        FieldValue::Relation(TypedRelation {
            relation_type: non_empty(relation_type),
            target: RecordId(target),
        })
    }

    /// Topic value
    pub fn topic<S: AsRef<str>>(topic_type: &str, terms: &[S]) -> Self {
        FieldValue::Topic(TopicValue {
            topic_type: topic_type.to_string(),
            terms: terms.iter().map(|t| t.as_ref().to_string()).collect(),
        })
    }

    /// Type code of a typed value, topic or relation
    pub fn type_code(&self) -> Option<&str> {
        match self {
            FieldValue::Typed(v) => v.value_type.as_deref(),
            FieldValue::Topic(v) => Some(v.topic_type.as_str()),
            FieldValue::Relation(r) => r.relation_type.as_deref(),
            FieldValue::Scalar(_) | FieldValue::Interval(_) => None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Key under which a typed value is indexed in addition to its base field
///
/// `derived_key("name", "acronym") == "name-acronym"`. The index schema
/// declares a `base-*` dynamic template for every field that can produce one.
pub fn derived_key(base: &str, type_code: &str) -> String {
    format!("{}-{}", base, type_code)
}

/// Postal address of a place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// City
    #[serde(default)]
    pub locality: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country: Option<String>,
    /// Continent code (`EU`, `AF`, `AS`, `NA`, `SA`, `OC`, `AN`)
    #[serde(default)]
    pub continent: Option<String>,
}

impl PostalAddress {
    /// Address in a country, with its continent
    pub fn new(locality: Option<&str>, continent: &str, country: &str) -> Self {
        PostalAddress {
            locality: locality.map(str::to_string),
            country: non_empty(country),
            continent: non_empty(continent),
        }
    }

    /// `continent/country` path used for geographic faceting
    ///
    /// Returns just the country when the continent is unknown and None when
    /// the country is unknown.
    pub fn continent_and_country(&self) -> Option<String> {
        let country = self.country.as_deref().filter(|c| !c.is_empty())?;
        match self.continent.as_deref().filter(|c| !c.is_empty()) {
            Some(continent) => Some(format!("{}/{}", continent, country)),
            None => Some(country.to_string()),
        }
    }
}

/// Render a date-time as RFC 3339 with an explicit offset (`+00:00`, never `Z`)
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a date or date-time
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD`. Values without an offset are placed in `default_offset`.
pub fn parse_datetime(s: &str, default_offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| Error::InvalidDate(s.to_string()))?;
    default_offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}
