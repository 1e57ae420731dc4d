mod content;
mod summary;

pub use content::{ContentItem, RevisionMarker};
pub use summary::{BulkReport, FailureReason, GenerationOutcome, SummaryRecord, SummaryState};
