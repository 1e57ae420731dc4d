pub const SCHEMA: &str = r#"
-- items table
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL,
    revision TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- summaries table
CREATE TABLE IF NOT EXISTS summaries (
    item_id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    source_revision TEXT,
    model_version TEXT NOT NULL,
    generated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
