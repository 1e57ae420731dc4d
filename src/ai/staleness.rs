//! Decides whether a stored summary still matches its item.
//!
//! Pure functions: no I/O, same answer for the same inputs.

use crate::models::{ContentItem, SummaryRecord, SummaryState};

/// True when the summary must be (re)generated for `item`.
///
/// A missing record, a record without a source revision, or a revision that
/// differs from the item's current one all count as stale. Comparison is
/// exact equality.
pub fn needs_regeneration(item: &ContentItem, record: Option<&SummaryRecord>) -> bool {
    let Some(record) = record else {
        return true;
    };

    match &record.source_revision {
        Some(marker) if !marker.is_empty() => *marker != item.revision,
        _ => true,
    }
}

/// A record counts as a summary only when its text is non-empty.
pub fn has_summary(record: Option<&SummaryRecord>) -> bool {
    record.is_some_and(|r| !r.content.trim().is_empty())
}

pub fn summary_state(item: &ContentItem, record: Option<&SummaryRecord>) -> SummaryState {
    if !has_summary(record) {
        SummaryState::Missing
    } else if needs_regeneration(item, record) {
        SummaryState::Outdated
    } else {
        SummaryState::Current
    }
}
