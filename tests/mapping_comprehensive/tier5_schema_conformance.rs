//! Tier 5: Schema Conformance
//!
//! Every key the mapper emits is declared by the index schema, exactly or
//! through a dynamic template.

use crate::common::*;
use activity_index::{
    schema_for, Error, FieldKind, FieldSchema, IndexType, MappingBuilder, RecordSchema,
    ScalarKind,
};

fn full_event(fx: &mut Fixture) -> Record {
    fx.store.insert(
        work(1)
            .with("person", [FieldValue::relation("director", 30)])
            .with("topic", [FieldValue::topic("geo", &["spain"])]),
    );
    event_of(2, 1)
        .with("name", [FieldValue::typed_text("usual", "Opening")])
        .with("content", [FieldValue::typed_text("summary", "First night")])
        .with("topic", [FieldValue::topic("subject", &["jazz"])])
        .with("link", [FieldValue::typed_text("ticketing", "https://t.example")])
        .with("organization", [FieldValue::relation("venue-owner", 9)])
        .with("number", [FieldValue::typed_text("licence", "L-1")])
        .with("place", [FieldValue::relation("venue", 10)])
        .with("event", [FieldValue::relation("previous", 1)])
        .with("startend", [interval("2020-03-01", Some("2020-03-02"))])
}

/// A fully populated event conforms to the event index schema
#[test]
fn test_tier5_every_key_is_declared() {
    let mut fx = Fixture::with_places();
    let record = full_event(&mut fx);
    let doc = fx.map(&record);
    let schema = fx.registry.index_schema(RecordType::Event).unwrap();

    for key in doc.keys() {
        assert!(schema.accepts(key), "{} is not declared", key);
    }
    assert!(schema.check(&doc).is_ok());
    assert!(doc.contains_key("topic-geo-hierarchy"));
    assert!(doc.contains_key("link-ticketing"));
}

/// Derived keys get the index type of their base field
#[test]
fn test_tier5_templates_copy_base_type() {
    let fx = Fixture::new();
    let schema = fx.registry.index_schema(RecordType::Event).unwrap();
    assert_eq!(schema.index_type_of("place-venue"), Some(&IndexType::Integer));
    assert_eq!(schema.index_type_of("link-ticketing"), Some(&IndexType::Url));
    assert_eq!(schema.index_type_of("colour"), None);

    let json = schema.to_json();
    assert_eq!(json["properties"]["geoloc-hierarchy"]["type"], "keyword");
    assert_eq!(json["properties"]["startend"]["type"], "nested");
    assert_eq!(
        json["properties"]["startend"]["properties"]["start"]["format"],
        "date_time_no_millis"
    );
}

fn schema_with_colour() -> RecordSchema {
    let mut fields = schema_for(RecordType::Work).unwrap().fields().to_vec();
    fields.push(FieldSchema {
        name: "colour".to_string(),
        kind: FieldKind::Scalar(ScalarKind::Text),
        repeatable: true,
        sub_fields: Vec::new(),
        lookup_table: None,
        default_type: None,
    });
    RecordSchema::new(RecordType::Work, fields)
}

/// A field missing from the index schema fails validation
#[test]
fn test_tier5_undeclared_field_rejected() {
    let thesaurus = test_thesaurus();
    let registry = SchemaRegistry::builder()
        .register(schema_with_colour())
        .build(&thesaurus);
    let store = MemoryRecordStore::new();
    let mut config = MapperConfig::default();

    let record = work(1).with(
        "colour",
        [FieldValue::Scalar(activity_index::Scalar::Text("blue".to_string()))],
    );
    let err = DocumentMapper::new(&registry, &store, &thesaurus, &config)
        .map(&record)
        .unwrap_err();
    assert_eq!(err, Error::UndeclaredField("colour".to_string()));
    assert!(err.is_fatal_to_mapping());

    config.validate_documents = false;
    let doc = DocumentMapper::new(&registry, &store, &thesaurus, &config)
        .map(&record)
        .unwrap();
    assert_eq!(texts(&doc, "colour"), vec!["blue"]);
}

/// The default type of a field gets no derived key
#[test]
fn test_tier5_default_type_has_no_derived_key() {
    let thesaurus = test_thesaurus();
    let mut fields = schema_for(RecordType::Work).unwrap().fields().to_vec();
    if let Some(name) = fields.iter_mut().find(|f| f.name == "name") {
        name.default_type = Some("usual".to_string());
    }
    let registry = SchemaRegistry::builder()
        .register(RecordSchema::new(RecordType::Work, fields))
        .build(&thesaurus);
    let store = MemoryRecordStore::new();
    let config = MapperConfig::default();
    let mapper = DocumentMapper::new(&registry, &store, &thesaurus, &config);

    let record = work(1).with(
        "name",
        [
            FieldValue::typed_text("usual", "Festival"),
            FieldValue::typed_text("acronym", "F"),
        ],
    );
    let doc = mapper.map(&record).unwrap();
    assert_eq!(texts(&doc, "name"), vec!["Festival", "F"]);
    assert!(!doc.contains_key("name-usual"));
    assert_eq!(texts(&doc, "name-acronym"), vec!["F"]);
}

/// Building twice gives the same schema; re-declaring keeps position
#[test]
fn test_tier5_builder() {
    let mut builder = MappingBuilder::new();
    builder.add_field("name", IndexType::text()).typed_template();
    builder.add_nested("startend", |nested| {
        nested.add_field("start", IndexType::DateTime);
    });
    builder.add_field("name", IndexType::Literal);

    let first = builder.build(RecordType::Work);
    assert_eq!(first, builder.build(RecordType::Work));
    assert_eq!(first.fields()[0].name, "name");
    assert_eq!(first.fields()[0].index_type, IndexType::Literal);
    assert!(!first.accepts("name-acronym"));
}
