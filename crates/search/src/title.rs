//! Post titles
//!
//! Works are titled by their first name. Events get
//! `"name (cities, dates)"`, falling back to the parent work's name and to
//! configured placeholders for whatever is unknown.

use crate::config::MapperConfig;
use crate::document::dedup_in_order;
use crate::mapping::{PLACE, STARTEND};
use activity_core::{DateInterval, Record, RecordStore};
use chrono::{DateTime, FixedOffset};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Title of a work
pub fn work_title(work: &Record, config: &MapperConfig) -> String {
    work.first_text("name")
        .unwrap_or_else(|| config.untitled_work.clone())
}

/// Title of an event
///
/// `parent` is the event's work when it could be resolved.
pub fn event_title(
    event: &Record,
    parent: Option<&Record>,
    store: &dyn RecordStore,
    config: &MapperConfig,
) -> String {
    let name = event
        .first_text("name")
        .or_else(|| parent.and_then(|work| work.first_text("name")))
        .unwrap_or_else(|| config.untitled_event.clone());

    let cities = event_cities(event, store);
    let cities = if cities.is_empty() {
        config.unknown_place.clone()
    } else {
        cities.join(" / ")
    };

    let dates = match DateInterval::span(event.intervals(STARTEND)) {
        Some((start, end)) => format_dates(&start, &end),
        None => config.unknown_date.clone(),
    };

    format!("{} ({}, {})", name, cities, dates)
}

/// Unique localities of the event's places, in place then address order
fn event_cities(event: &Record, store: &dyn RecordStore) -> Vec<String> {
    let localities = event.relations(PLACE).flat_map(|place| {
        store
            .postal_addresses(place.target)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.locality)
            .filter(|l| !l.is_empty())
    });
    dedup_in_order(localities)
}

fn format_dates(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> String {
    let start = start.format(DATE_FORMAT).to_string();
    let end = end.format(DATE_FORMAT).to_string();
    if start == end {
        start
    } else {
        format!("{} - {}", start, end)
    }
}
