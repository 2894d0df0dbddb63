//! SQL migration definitions for the catalog index database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: documents with embeddings",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Catalog documents (products and FAQs) and their embeddings
CREATE TABLE IF NOT EXISTS documents (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    source         TEXT NOT NULL UNIQUE,
    content        TEXT NOT NULL,
    content_hash   TEXT NOT NULL,
    model_id       TEXT NOT NULL,
    embedding_json TEXT NOT NULL,
    indexed_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_model ON documents(model_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
