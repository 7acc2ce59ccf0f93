//! Document mapper
//!
//! Turns a [`Record`] into the flat [`IndexDocument`] described by its
//! index schema:
//! - multi-field flattening: values under the base key, typed values also
//!   under `base-type`
//! - topic hierarchies through the thesaurus
//! - event dates aggregated into `startend`, `startdate`, `enddate` and
//!   `startdate-hierarchy`
//! - event places aggregated into `geoloc-hierarchy`
//! - inherited fields of the parent work merged into event documents
//!
//! Missing data never fails a mapping. Unresolved relations and malformed
//! intervals are skipped and logged at debug level.

use crate::config::MapperConfig;
use crate::document::{dedup_in_order, texts, DocScalar, IndexDocument};
use crate::inherit::{merge, MergeRules};
use crate::mapping::{
    topic_hierarchy_key, END_DATE, GEOLOC_HIERARCHY, PLACE, POST_TITLE, STARTEND, START_DATE,
    START_DATE_HIERARCHY, TYPE, WORK,
};
use crate::registry::{RegisteredSchema, SchemaRegistry};
use crate::thesaurus::PathResolver;
use crate::title::{event_title, work_title};
use activity_core::{
    derived_key, format_datetime, DateInterval, FieldSchema, FieldValue, Record, RecordId,
    RecordStore, RecordType, Result, Thesaurus,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::debug;

/// Maps records to index documents
///
/// Holds only shared references, so one mapper (or many) can run on any
/// number of threads against the same registry.
pub struct DocumentMapper<'a> {
    registry: &'a SchemaRegistry,
    store: &'a dyn RecordStore,
    resolver: PathResolver<'a>,
    config: &'a MapperConfig,
    rules: MergeRules,
}

impl<'a> DocumentMapper<'a> {
    /// Mapper using the event-from-work inheritance rules
    pub fn new(
        registry: &'a SchemaRegistry,
        store: &'a dyn RecordStore,
        thesaurus: &'a dyn Thesaurus,
        config: &'a MapperConfig,
    ) -> Self {
        DocumentMapper {
            registry,
            store,
            resolver: PathResolver::new(thesaurus),
            config,
            rules: MergeRules::event_from_work(),
        }
    }

    /// Replace the inheritance rules
    pub fn with_rules(mut self, rules: MergeRules) -> Self {
        self.rules = rules;
        self
    }

    /// Build the index document of a record
    ///
    /// # Errors
    ///
    /// - `SchemaNotFound` when the record type (or, for an event with a
    ///   parent, the work type) is not registered
    /// - `UndeclaredField` when document validation is enabled and a key is
    ///   not declared by the index schema
    pub fn map(&self, record: &Record) -> Result<IndexDocument> {
        let entry = self.registry.get(record.record_type())?;
        let mut doc = IndexDocument::new();
        doc.set_single(TYPE, DocScalar::text(record.record_type().as_str()));

        for field in entry.fields.fields() {
            flatten_field(record, field, &mut doc);
        }
        self.expand_topics(record, entry, &mut doc);

        let title = match record.record_type() {
            RecordType::Work => work_title(record, self.config),
            RecordType::Event => {
                let parent = self.parent_work(record);
                if let Some(parent) = &parent {
                    let inherited = self.inherited_document(parent)?;
                    merge(&mut doc, &inherited, &self.rules);
                }
                aggregate_dates(record, &mut doc);
                self.aggregate_places(record, &mut doc);
                event_title(record, parent.as_ref(), self.store, self.config)
            }
        };
        doc.set_single(POST_TITLE, DocScalar::Text(title));

        if self.config.validate_documents {
            entry.index.check(&doc)?;
        }
        debug!(
            target: "activity::mapper",
            record_type = %record.record_type(),
            record_id = %record.id(),
            keys = doc.len(),
            "Record mapped"
        );
        Ok(doc)
    }

    /// Ingest a record from its stored JSON form and map it
    ///
    /// Ingestion is lenient: values that do not parse and fields the schema
    /// does not declare are dropped, so irregular stored data gives a
    /// partial document rather than an error. Dates without an offset are
    /// read in the configured default offset.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentMapper::map`], plus `Config` for an invalid
    /// default offset.
    pub fn map_json(
        &self,
        record_type: RecordType,
        id: u64,
        data: &JsonValue,
    ) -> Result<IndexDocument> {
        let entry = self.registry.get(record_type)?;
        let record = Record::from_json_lenient(&entry.fields, id, data, self.config.offset()?)?;
        self.map(&record)
    }

    /// `topic-<t>-hierarchy` for every thesaurus-backed topic type
    fn expand_topics(&self, record: &Record, entry: &RegisteredSchema, doc: &mut IndexDocument) {
        for topic in &entry.thesaurus_topics {
            let terms = record
                .topics()
                .filter(|t| t.topic_type == topic.topic)
                .flat_map(|t| t.terms.iter());
            let path = self.resolver.resolve_path(&topic.table, terms);
            doc.set_list(&topic_hierarchy_key(&topic.topic), texts(path));
        }
    }

    fn parent_work(&self, event: &Record) -> Option<Record> {
        let id = event.first_relation(WORK)?;
        let parent = self.store.get_record(RecordType::Work, id);
        if parent.is_none() {
            debug!(
                target: "activity::mapper",
                record_id = %event.id(),
                work = %id,
                "Parent work not found, nothing inherited"
            );
        }
        parent
    }

    /// Document of the parent work, restricted to the inherited fields
    fn inherited_document(&self, parent: &Record) -> Result<IndexDocument> {
        let entry = self.registry.get(RecordType::Work)?;
        let mut doc = IndexDocument::new();
        for field in entry.fields.fields() {
            if self.rules.policy_for(&field.name).is_some() {
                flatten_field(parent, field, &mut doc);
            }
        }
        if self.rules.policy_for("topic").is_some() {
            self.expand_topics(parent, entry, &mut doc);
        }
        Ok(doc)
    }

    /// `continent/country` of every address of every resolvable place
    fn aggregate_places(&self, event: &Record, doc: &mut IndexDocument) {
        let paths = event.relations(PLACE).flat_map(|place| {
            let addresses = self.store.postal_addresses(place.target).unwrap_or_else(|| {
                debug!(
                    target: "activity::mapper",
                    record_id = %event.id(),
                    place = %place.target,
                    "Place not found, skipped"
                );
                Vec::new()
            });
            addresses
                .into_iter()
                .filter_map(|a| a.continent_and_country())
        });
        doc.set_list(GEOLOC_HIERARCHY, texts(dedup_in_order(paths)));
    }
}

/// Values of one field under its base key and derived keys
///
/// Intervals are left to date aggregation.
fn flatten_field(record: &Record, field: &FieldSchema, doc: &mut IndexDocument) {
    let base = field.name.as_str();
    for value in record.values(base) {
        let scalars: Vec<DocScalar> = match value {
            FieldValue::Scalar(s) if !s.is_empty() => vec![DocScalar::from(s)],
            FieldValue::Typed(t) if !t.value.is_empty() => vec![DocScalar::from(&t.value)],
            FieldValue::Topic(t) => t
                .terms
                .iter()
                .filter(|term| !term.is_empty())
                .map(|term| DocScalar::text(term.as_str()))
                .collect(),
            FieldValue::Relation(r) => {
                let Some(id) = id_scalar(record, base, r.target) else {
                    continue;
                };
                if !field.repeatable {
                    doc.set_single(base, id);
                    continue;
                }
                vec![id]
            }
            _ => continue,
        };

        let derived = value
            .type_code()
            .filter(|code| field.has_derived_key(code))
            .map(|code| derived_key(base, code));
        for scalar in scalars {
            if let Some(key) = &derived {
                doc.append(key, scalar.clone());
            }
            doc.append(base, scalar);
        }
    }
}

/// Record id as an index integer, None when it does not fit in 64 signed bits
fn id_scalar(record: &Record, field: &str, id: RecordId) -> Option<DocScalar> {
    match i64::try_from(id.get()) {
        Ok(id) => Some(DocScalar::Integer(id)),
        Err(_) => {
            debug!(
                target: "activity::mapper",
                record_id = %record.id(),
                field,
                related = %id,
                "Related record id out of index range, skipped"
            );
            None
        }
    }
}

/// `startend`, `startdate`, `enddate` and `startdate-hierarchy` of an event
fn aggregate_dates(event: &Record, doc: &mut IndexDocument) {
    let mut nested = Vec::new();
    for interval in event.intervals(STARTEND) {
        match interval.bounds() {
            Some((start, end)) => {
                let mut obj = BTreeMap::new();
                obj.insert("start".to_string(), DocScalar::Text(format_datetime(&start)));
                obj.insert("end".to_string(), DocScalar::Text(format_datetime(&end)));
                nested.push(obj);
            }
            None => debug!(
                target: "activity::mapper",
                record_id = %event.id(),
                "Interval without start, skipped"
            ),
        }
    }
    doc.set_nested(STARTEND, nested);

    if let Some((start, end)) = DateInterval::span(event.intervals(STARTEND)) {
        doc.set_single(START_DATE, DocScalar::Text(format_datetime(&start)));
        doc.set_single(END_DATE, DocScalar::Text(format_datetime(&end)));
        doc.set_single(
            START_DATE_HIERARCHY,
            DocScalar::Text(start.format("%Y").to_string()),
        );
    }
}
