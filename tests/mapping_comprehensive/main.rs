//! Mapping Comprehensive Test Suite
//!
//! End-to-end tests of record to index document mapping.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Flattening** (base keys, derived keys, value kinds)
//! - **Tier 2: Hierarchies** (thesaurus paths, vocabulary selection)
//! - **Tier 3: Event Aggregation** (dates, geolocation, titles)
//! - **Tier 4: Inheritance** (overwrite, merge, exclusion, unresolved parents)
//! - **Tier 5: Schema Conformance** (index schema, validation)
//! - **Tier 6: Ingestion and Config** (stored JSON, `activity-index.toml`)
//! - **Tier 7: Properties** (idempotence, dense lists, dedup)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test mapping_comprehensive
//!
//! # Run specific tier
//! cargo test --test mapping_comprehensive tier4
//! ```

#[path = "../common/mod.rs"]
mod common;

mod tier3_event_aggregation;
mod tier4_inheritance;
mod tier5_schema_conformance;
