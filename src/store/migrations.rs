pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    body_json TEXT NOT NULL,
    UNIQUE(collection, id)
);
CREATE INDEX IF NOT EXISTS idx_documents_collection_created
    ON documents(collection, created_at DESC);
"#;
