//! SQLite schema definition.

/// Database schema for the document store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Documents
-- ============================================================================

-- Every collection shares one table; a document is addressed by
-- (collection, doc_id) and its fields live in `body` as a JSON object.
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    doc_id TEXT NOT NULL,
    body TEXT NOT NULL,                          -- JSON object
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
"#;
