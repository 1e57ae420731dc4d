use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::{GenerationConfig, MaxAttempts, Settings, Toggle};
use crate::db::SummaryStore;
use crate::error::Result;
use crate::models::{BulkReport, ContentItem, GenerationOutcome, SummaryRecord, SummaryState};

use super::client::RetryingClient;
use super::{composer, staleness};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Attempt budget used by [`SummaryEngine::refresh_with_default_retries`].
    pub default_max_retries: MaxAttempts,
    pub update_on_save: Toggle,
    pub bulk_concurrency: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_max_retries: MaxAttempts::default(),
            update_on_save: Toggle::No,
            bulk_concurrency: 1,
        }
    }
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            default_max_retries: settings.max_retries,
            update_on_save: settings.update_on_save,
            bulk_concurrency: settings.bulk_concurrency,
        }
    }
}

enum BulkItem {
    Generated,
    Failed,
    Skipped,
}

pub struct SummaryEngine {
    client: RetryingClient,
    store: Arc<dyn SummaryStore>,
    options: EngineOptions,
}

impl SummaryEngine {
    pub fn new(client: RetryingClient, store: Arc<dyn SummaryStore>, options: EngineOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Generates a summary for `item` without storing it.
    ///
    /// On success the caller should persist the text together with
    /// `item.revision`; [`SummaryEngine::regenerate`] does exactly that.
    pub async fn refresh(
        &self,
        item: &ContentItem,
        config: &GenerationConfig,
        prompt_override: Option<&str>,
    ) -> GenerationOutcome {
        self.refresh_with_attempts(item, config, prompt_override, config.max_retries)
            .await
    }

    /// Same as [`SummaryEngine::refresh`], but the attempt budget comes from the
    /// engine's stored default instead of `config`.
    pub async fn refresh_with_default_retries(
        &self,
        item: &ContentItem,
        config: &GenerationConfig,
        prompt_override: Option<&str>,
    ) -> GenerationOutcome {
        self.refresh_with_attempts(item, config, prompt_override, self.options.default_max_retries)
            .await
    }

    async fn refresh_with_attempts(
        &self,
        item: &ContentItem,
        config: &GenerationConfig,
        prompt_override: Option<&str>,
        max_attempts: MaxAttempts,
    ) -> GenerationOutcome {
        if let Err(reason) = config.validate() {
            tracing::warn!("Skipping summary for {}: {}", item.id, reason);
            return GenerationOutcome::Failure(reason);
        }

        let prompt = composer::resolve_prompt(config, prompt_override);
        let payload = composer::compose_with_prompt(item, config, prompt);

        let outcome = self
            .client
            .send(
                &payload,
                &config.credential,
                &config.endpoint,
                max_attempts,
                config.request_timeout,
            )
            .await;

        match &outcome {
            GenerationOutcome::Success(_) => tracing::info!("Generated summary for {}", item.id),
            GenerationOutcome::Failure(reason) => {
                tracing::warn!("Failed to generate summary for {}: {}", item.id, reason)
            }
        }

        outcome
    }

    /// Refreshes and, on success, stores the summary against the item's
    /// current revision.
    pub async fn regenerate(
        &self,
        item: &ContentItem,
        config: &GenerationConfig,
        prompt_override: Option<&str>,
    ) -> Result<GenerationOutcome> {
        let outcome = self.refresh(item, config, prompt_override).await;

        if let GenerationOutcome::Success(text) = &outcome {
            let record = SummaryRecord::new(
                item.id.clone(),
                text.clone(),
                item.revision.clone(),
                config.model.clone(),
            );
            self.store.save_summary(record).await?;
        }

        Ok(outcome)
    }

    pub async fn clear(&self, item_id: &str) -> Result<()> {
        self.store.delete_summary(item_id).await
    }

    /// Stored summary text, if a record exists. The text may be empty; use
    /// [`SummaryEngine::has_summary`] to test for a usable summary.
    pub async fn current_summary(&self, item_id: &str) -> Result<Option<String>> {
        Ok(self.store.get_summary(item_id).await?.map(|r| r.content))
    }

    pub async fn has_summary(&self, item_id: &str) -> Result<bool> {
        let record = self.store.get_summary(item_id).await?;
        Ok(staleness::has_summary(record.as_ref()))
    }

    pub async fn needs_regeneration(&self, item: &ContentItem) -> Result<bool> {
        let record = self.store.get_summary(&item.id).await?;
        Ok(staleness::needs_regeneration(item, record.as_ref()))
    }

    pub async fn summary_state(&self, item: &ContentItem) -> Result<SummaryState> {
        let record = self.store.get_summary(&item.id).await?;
        Ok(staleness::summary_state(item, record.as_ref()))
    }

    /// Hook for "the item was just saved". Regenerates only when automatic
    /// updates are on and an existing summary has gone stale.
    pub async fn on_item_saved(
        &self,
        item: &ContentItem,
        config: &GenerationConfig,
    ) -> Result<Option<GenerationOutcome>> {
        if !self.options.update_on_save.is_enabled() {
            return Ok(None);
        }

        if self.summary_state(item).await? != SummaryState::Outdated {
            return Ok(None);
        }

        tracing::debug!("Item {} changed, regenerating its summary", item.id);
        self.regenerate(item, config, None).await.map(Some)
    }

    /// Generates summaries for items that have none or an outdated one.
    ///
    /// Items are independent: a failure is counted and the run continues.
    pub async fn refresh_many(&self, items: Vec<ContentItem>, config: &GenerationConfig) -> BulkReport {
        let mut seen = HashSet::new();
        let items: Vec<ContentItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        let results: Vec<BulkItem> = stream::iter(items)
            .map(|item| async move { self.refresh_one(&item, config).await })
            .buffer_unordered(self.options.bulk_concurrency.max(1))
            .collect()
            .await;

        let mut report = BulkReport::default();
        for result in results {
            match result {
                BulkItem::Generated => report.generated += 1,
                BulkItem::Failed => report.failed += 1,
                BulkItem::Skipped => report.skipped += 1,
            }
        }

        tracing::info!(
            "Bulk refresh: {} generated, {} failed, {} skipped",
            report.generated,
            report.failed,
            report.skipped
        );
        report
    }

    async fn refresh_one(&self, item: &ContentItem, config: &GenerationConfig) -> BulkItem {
        match self.summary_state(item).await {
            Ok(SummaryState::Current) => return BulkItem::Skipped,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read summary for {}: {}", item.id, e);
                return BulkItem::Failed;
            }
        }

        match self.regenerate(item, config, None).await {
            Ok(outcome) if outcome.is_success() => BulkItem::Generated,
            Ok(_) => BulkItem::Failed,
            Err(e) => {
                tracing::error!("Failed to store summary for {}: {}", item.id, e);
                BulkItem::Failed
            }
        }
    }

    /// Deletes every stored summary.
    pub async fn purge(&self) -> Result<usize> {
        self.store.delete_all_summaries().await
    }
}
