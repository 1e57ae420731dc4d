//! Keeps a short AI-generated summary in sync with each content item.
//!
//! [`ai::SummaryEngine`] decides when a stored summary is stale and drives a
//! bounded-retry request against an OpenAI-style chat completions endpoint.
//! Storage of items and summaries sits behind the traits in [`db`].

pub mod ai;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use ai::SummaryEngine;
pub use config::{GenerationConfig, MaxAttempts, Settings, Toggle};
pub use error::{AppError, Result};
pub use models::{ContentItem, FailureReason, GenerationOutcome, RevisionMarker, SummaryRecord};
