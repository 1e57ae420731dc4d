use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{ContentItem, RevisionMarker, SummaryRecord};

use super::schema::SCHEMA;
use super::{ContentSource, SummaryStore};

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Item operations

    /// Inserts or replaces an item. Returns true when the stored revision
    /// changed (or the item is new).
    pub async fn upsert_item(&self, item: ContentItem) -> Result<bool> {
        let changed = self
            .conn
            .call(move |conn| {
                let previous: Option<String> = conn
                    .query_row(
                        "SELECT revision FROM items WHERE id = ?1",
                        params![item.id],
                        |row| row.get(0),
                    )
                    .optional()?;

                conn.execute(
                    r#"INSERT INTO items (id, title, body, revision)
                       VALUES (?1, ?2, ?3, ?4)
                       ON CONFLICT(id) DO UPDATE SET
                           title = excluded.title,
                           body = excluded.body,
                           revision = excluded.revision,
                           updated_at = datetime('now')"#,
                    params![item.id, item.title, item.body, item.revision.as_str()],
                )?;

                Ok(previous.as_deref() != Some(item.revision.as_str()))
            })
            .await?;
        Ok(changed)
    }

    /// Records a new revision marker for an existing item.
    pub async fn set_revision(&self, id: &str, revision: RevisionMarker) -> Result<bool> {
        let id = id.to_string();
        let updated = self
            .conn
            .call(move |conn| {
                let rows = conn.execute(
                    "UPDATE items SET revision = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![revision.as_str(), id],
                )?;
                Ok(rows > 0)
            })
            .await?;
        Ok(updated)
    }
}

#[async_trait]
impl ContentSource for Repository {
    async fn get_item(&self, id: &str) -> Result<Option<ContentItem>> {
        let id = id.to_string();
        let item = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, title, body, revision FROM items WHERE id = ?1")?;
                let item = stmt.query_row(params![id], item_from_row).optional()?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    async fn list_items(&self) -> Result<Vec<ContentItem>> {
        let items = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, title, body, revision FROM items ORDER BY id")?;
                let items = stmt
                    .query_map([], item_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }
}

#[async_trait]
impl SummaryStore for Repository {
    async fn get_summary(&self, item_id: &str) -> Result<Option<SummaryRecord>> {
        let item_id = item_id.to_string();
        let summary = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT item_id, content, source_revision, model_version, generated_at FROM summaries WHERE item_id = ?1",
                )?;
                let summary = stmt
                    .query_row(params![item_id], summary_from_row)
                    .optional()?;
                Ok(summary)
            })
            .await?;
        Ok(summary)
    }

    async fn save_summary(&self, record: SummaryRecord) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO summaries (item_id, content, source_revision, model_version, generated_at)
                       VALUES (?1, ?2, ?3, ?4, ?5)
                       ON CONFLICT(item_id) DO UPDATE SET
                           content = excluded.content,
                           source_revision = excluded.source_revision,
                           model_version = excluded.model_version,
                           generated_at = excluded.generated_at"#,
                    params![
                        record.item_id,
                        record.content,
                        record.source_revision.as_ref().map(|r| r.as_str().to_string()),
                        record.model_version,
                        record.generated_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn delete_summary(&self, item_id: &str) -> Result<()> {
        let item_id = item_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM summaries WHERE item_id = ?1", params![item_id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn delete_all_summaries(&self) -> Result<usize> {
        let removed = self
            .conn
            .call(|conn| {
                let removed = conn.execute("DELETE FROM summaries", [])?;
                Ok(removed)
            })
            .await?;
        Ok(removed)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn item_from_row(row: &Row) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        revision: RevisionMarker::new(row.get::<_, String>(3)?),
    })
}

fn summary_from_row(row: &Row) -> rusqlite::Result<SummaryRecord> {
    Ok(SummaryRecord {
        item_id: row.get(0)?,
        content: row.get(1)?,
        source_revision: row.get::<_, Option<String>>(2)?.map(RevisionMarker::new),
        model_version: row.get(3)?,
        generated_at: row
            .get::<_, String>(4)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}
