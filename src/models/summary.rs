use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RevisionMarker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub item_id: String,
    pub content: String,
    /// Revision of the item the summary was generated from. `None` for records
    /// written without one, which always count as stale.
    pub source_revision: Option<RevisionMarker>,
    pub model_version: String,
    pub generated_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn new(
        item_id: impl Into<String>,
        content: impl Into<String>,
        source_revision: RevisionMarker,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            content: content.into(),
            source_revision: Some(source_revision),
            model_version: model_version.into(),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryState {
    #[default]
    Missing,
    Outdated,
    Current,
}

impl SummaryState {
    pub fn label(self) -> &'static str {
        match self {
            SummaryState::Missing => "no summary",
            SummaryState::Outdated => "outdated",
            SummaryState::Current => "up-to-date",
        }
    }
}

/// Why a generation call produced no summary. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("generation is not configured: missing {0}")]
    Misconfigured(&'static str),

    #[error("no response from the generation API: {0}")]
    TransportFailure(String),

    #[error("generation API kept failing with status {0}")]
    RateLimitedOrServerError(u16),

    #[error("generation API rejected the request with status {0}")]
    ClientError(u16),

    #[error("generation API returned no usable summary")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    Failure(FailureReason),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Success(text) => Some(text),
            GenerationOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// Tally of a bulk refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub generated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.generated + self.failed + self.skipped
    }

    /// Every attempted item failed and nothing was produced.
    pub fn is_total_failure(&self) -> bool {
        self.failed > 0 && self.generated == 0
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_total_failure() {
            return write!(
                f,
                "Failed to generate any AI summaries. Please check your API settings."
            );
        }

        if self.generated > 0 {
            write!(
                f,
                "Successfully generated {} AI {}.",
                self.generated,
                plural(self.generated, "summary", "summaries")
            )?;
            if self.failed > 0 {
                write!(
                    f,
                    " {} {} failed.",
                    self.failed,
                    plural(self.failed, "request", "requests")
                )?;
            }
            if self.skipped > 0 {
                write!(
                    f,
                    " {} {} already up-to-date.",
                    self.skipped,
                    plural(self.skipped, "summary", "summaries")
                )?;
            }
            return Ok(());
        }

        if self.skipped > 0 {
            return write!(
                f,
                "No summaries generated. All {} selected {} already up-to-date.",
                self.skipped,
                plural(self.skipped, "summary is", "summaries are")
            );
        }

        write!(f, "No items selected.")
    }
}
