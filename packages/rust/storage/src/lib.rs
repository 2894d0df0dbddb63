//! libSQL-backed catalog index (offline mode).
//!
//! The [`Storage`] struct wraps a local libSQL database holding catalog
//! documents and their embeddings, and answers top-`k` similarity queries.
//!
//! **Access rules:**
//! - `salesagent ingest`: read-write via [`Storage::open`]
//! - chat surfaces: read-only via [`Storage::open_readonly`]

mod migrations;
mod similarity;

use std::cmp::Ordering;
use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, Row, Rows, params};
use salesagent_shared::{Result, SalesAgentError};

pub use similarity::cosine_similarity;

/// A document with its embedding, as written by ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    /// Stable source identifier (`product:{id}` / `faq:{id}`).
    pub source: String,
    /// Embedded text.
    pub content: String,
    /// SHA-256 of `content`, hex encoded.
    pub content_hash: String,
    /// Embedding model that produced `embedding`.
    pub model_id: String,
    pub embedding: Vec<f32>,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub source: String,
    pub content: String,
    pub similarity: f32,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create an index at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SalesAgentError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing index at `path` for querying only.
    ///
    /// Fails with [`SalesAgentError::IndexUnavailable`] when the index has
    /// never been built.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SalesAgentError::IndexUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| SalesAgentError::IndexUnavailable(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| SalesAgentError::IndexUnavailable(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: true,
        };

        if storage.get_schema_version().await == 0 {
            return Err(SalesAgentError::IndexUnavailable(format!(
                "{} is not a catalog index",
                path.display()
            )));
        }
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        SalesAgentError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(SalesAgentError::Storage(
                "index is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Insert a document, replacing any previous version with the same source.
    pub async fn upsert_document(&self, doc: &IndexedDocument) -> Result<()> {
        self.check_writable()?;
        let embedding_json = serde_json::to_string(&doc.embedding)
            .map_err(|e| SalesAgentError::Storage(format!("encode embedding: {e}")))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO documents (source, content, content_hash, model_id, embedding_json, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(source) DO UPDATE SET
                   content = excluded.content,
                   content_hash = excluded.content_hash,
                   model_id = excluded.model_id,
                   embedding_json = excluded.embedding_json,
                   indexed_at = excluded.indexed_at",
                params![
                    doc.source.as_str(),
                    doc.content.as_str(),
                    doc.content_hash.as_str(),
                    doc.model_id.as_str(),
                    embedding_json.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Whether `source` is already indexed with this content hash and model.
    pub async fn is_current(&self, source: &str, content_hash: &str, model_id: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM documents
                 WHERE source = ?1 AND content_hash = ?2 AND model_id = ?3",
                params![source, content_hash, model_id],
            )
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(_)) => Ok(true),
            Ok(None) => Ok(false),
            Err(e) => Err(SalesAgentError::Storage(e.to_string())),
        }
    }

    /// Number of indexed documents.
    pub async fn document_count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM documents", params![])
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count = row
                    .get::<i64>(0)
                    .map_err(|e| SalesAgentError::Storage(e.to_string()))?;
                Ok(usize::try_from(count).unwrap_or(0))
            }
            Ok(None) => Ok(0),
            Err(e) => Err(SalesAgentError::Storage(e.to_string())),
        }
    }

    /// All indexed sources, sorted.
    pub async fn list_sources(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query("SELECT source FROM documents ORDER BY source", params![])
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        let mut sources = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            sources.push(
                row.get::<String>(0)
                    .map_err(|e| SalesAgentError::Storage(e.to_string()))?,
            );
        }
        Ok(sources)
    }

    /// Remove every document (used by `ingest --rebuild`).
    pub async fn clear(&self) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute("DELETE FROM documents", params![])
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Similarity search
    // -----------------------------------------------------------------------

    /// Return the `k` documents most similar to `query_embedding`, best first.
    pub async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut rows = self
            .conn
            .query(
                "SELECT source, content, embedding_json FROM documents",
                params![],
            )
            .await
            .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

        let mut hits = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            let source = row
                .get::<String>(0)
                .map_err(|e| SalesAgentError::Storage(e.to_string()))?;
            let content = row
                .get::<String>(1)
                .map_err(|e| SalesAgentError::Storage(e.to_string()))?;
            let embedding_json = row
                .get::<String>(2)
                .map_err(|e| SalesAgentError::Storage(e.to_string()))?;

            let embedding: Vec<f32> = match serde_json::from_str(&embedding_json) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(%source, error = %e, "skipping document with unreadable embedding");
                    continue;
                }
            };

            hits.push(ScoredDocument {
                similarity: cosine_similarity(query_embedding, &embedding),
                source,
                content,
            });
        }

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(k);

        tracing::debug!(k, hits = hits.len(), "similarity search complete");
        Ok(hits)
    }
}

/// Advance `rows`. A failed step is an error, not the end of the result set.
async fn next_row(rows: &mut Rows) -> Result<Option<Row>> {
    rows.next()
        .await
        .map_err(|e| SalesAgentError::Storage(e.to_string()))
}
