//! Calendar-day bucketing (UTC days).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::Event;

/// Number of events on each day that has at least one.
pub fn day_counts<'a>(events: impl IntoIterator<Item = &'a Event>) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.date_time.date_naive()).or_insert(0) += 1;
    }
    counts
}

/// Events falling on `day`, in input order.
pub fn events_on(events: &[Event], day: NaiveDate) -> Vec<&Event> {
    events
        .iter()
        .filter(|e| e.date_time.date_naive() == day)
        .collect()
}
