mod repository;
mod schema;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentItem, SummaryRecord};

pub use repository::Repository;

/// Read-only access to the content being summarized.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_item(&self, id: &str) -> Result<Option<ContentItem>>;
    async fn list_items(&self) -> Result<Vec<ContentItem>>;
}

/// Storage for summary records, keyed by item id.
///
/// "No record" and "record with empty text" must stay distinguishable.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn get_summary(&self, item_id: &str) -> Result<Option<SummaryRecord>>;
    async fn save_summary(&self, record: SummaryRecord) -> Result<()>;
    async fn delete_summary(&self, item_id: &str) -> Result<()>;
    /// Returns the number of records removed.
    async fn delete_all_summaries(&self) -> Result<usize>;
}
