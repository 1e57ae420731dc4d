use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::ai::{EngineOptions, HttpTransport, RetryingClient, SummaryEngine, TokioSleeper};
use crate::cli::AppAction;
use crate::config::{GenerationConfig, Settings};
use crate::db::{ContentSource, Repository};
use crate::error::{AppError, Result};
use crate::models::{ContentItem, GenerationOutcome, RevisionMarker};

pub struct App {
    settings: Settings,
    repository: Arc<Repository>,
    engine: SummaryEngine,
}

impl App {
    pub async fn new(settings: Settings) -> Result<Self> {
        let repository = Arc::new(Repository::new(&settings.db_path).await?);
        let client = RetryingClient::new(
            Arc::new(HttpTransport::new()?),
            Arc::new(TokioSleeper),
            settings.backoff_unit(),
        );
        let engine = SummaryEngine::new(client, repository.clone(), EngineOptions::from(&settings));

        Ok(Self::from_parts(settings, repository, engine))
    }

    pub fn from_parts(settings: Settings, repository: Arc<Repository>, engine: SummaryEngine) -> Self {
        Self {
            settings,
            repository,
            engine,
        }
    }

    pub fn engine(&self) -> &SummaryEngine {
        &self.engine
    }

    fn generation_config(&self) -> GenerationConfig {
        self.settings.generation_config()
    }

    async fn require_item(&self, id: &str) -> Result<ContentItem> {
        self.repository
            .get_item(id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))
    }

    /// Runs one action and returns the message to show the user.
    pub async fn handle_action(&self, action: AppAction) -> Result<String> {
        match action {
            AppAction::Import(path) => self.import_items(&path).await,

            AppAction::List => {
                let mut lines = Vec::new();
                for item in self.repository.list_items().await? {
                    let state = self.engine.summary_state(&item).await?;
                    lines.push(format!("{}\t{}\t{}", item.id, state.label(), item.title));
                }
                if lines.is_empty() {
                    Ok("No items.".to_string())
                } else {
                    Ok(lines.join("\n"))
                }
            }

            AppAction::Generate { id, prompt } => {
                let item = self.require_item(&id).await?;
                let existed = self.engine.has_summary(&id).await?;

                match self
                    .engine
                    .regenerate(&item, &self.generation_config(), prompt.as_deref())
                    .await?
                {
                    GenerationOutcome::Success(_) if existed => {
                        Ok("AI summary regenerated successfully.".to_string())
                    }
                    GenerationOutcome::Success(_) => Ok("AI summary generated successfully.".to_string()),
                    GenerationOutcome::Failure(reason) => Err(reason.into()),
                }
            }

            AppAction::Show(id) => match self.engine.current_summary(&id).await? {
                Some(text) if !text.trim().is_empty() => Ok(text),
                _ => Ok(format!("No AI summary for {}.", id)),
            },

            AppAction::Clear(id) => {
                self.engine.clear(&id).await?;
                Ok("AI summary cleared successfully.".to_string())
            }

            AppAction::Bulk(ids) => {
                let (items, unresolved) = if ids.is_empty() {
                    (self.repository.list_items().await?, 0)
                } else {
                    self.resolve_selection(&ids).await
                };

                let mut report = self
                    .engine
                    .refresh_many(items, &self.generation_config())
                    .await;
                report.failed += unresolved;
                Ok(report.to_string())
            }

            AppAction::Touch { id, revision } => {
                if !self
                    .repository
                    .set_revision(&id, RevisionMarker::new(revision))
                    .await?
                {
                    return Err(AppError::ItemNotFound(id));
                }
                let item = self.require_item(&id).await?;
                self.after_save(&item).await
            }

            AppAction::Purge => {
                let removed = self.engine.purge().await?;
                Ok(format!("Deleted {} AI summaries.", removed))
            }
        }
    }

    /// Looks up each selected id once. Ids that cannot be loaded are counted
    /// rather than stopping the batch.
    async fn resolve_selection(&self, ids: &[String]) -> (Vec<ContentItem>, usize) {
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(ids.len());
        let mut unresolved = 0;

        for id in ids.iter().filter(|id| seen.insert(id.as_str())) {
            match self.repository.get_item(id).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {
                    tracing::warn!("Skipping unknown item {}", id);
                    unresolved += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to load item {}: {}", id, e);
                    unresolved += 1;
                }
            }
        }

        (items, unresolved)
    }

    async fn import_items(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let items: Vec<ContentItem> = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid items file {}: {}", path.display(), e))?;
        let total = items.len();

        for item in items {
            if self.repository.upsert_item(item.clone()).await? {
                if let Err(e) = self.after_save(&item).await {
                    tracing::warn!("Update hook failed for {}: {}", item.id, e);
                }
            }
        }

        Ok(format!("Imported {} items from {}", total, path.display()))
    }

    async fn after_save(&self, item: &ContentItem) -> Result<String> {
        match self
            .engine
            .on_item_saved(item, &self.generation_config())
            .await?
        {
            None => Ok(format!("Recorded revision {} for {}.", item.revision, item.id)),
            Some(GenerationOutcome::Success(_)) => {
                Ok("AI summary regenerated successfully.".to_string())
            }
            Some(GenerationOutcome::Failure(reason)) => Err(reason.into()),
        }
    }
}
