//! End-to-end `ingest` pipeline: catalog CSVs → documents → embeddings → index.

use std::path::PathBuf;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use salesagent_shared::{CatalogDocument, Result, SalesAgentError};
use salesagent_storage::{IndexedDocument, Storage};

use crate::catalog;
use crate::provider::Embedder;

/// Configuration for the `ingest` pipeline.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Products CSV.
    pub products_csv: PathBuf,
    /// FAQs CSV.
    pub faqs_csv: PathBuf,
    /// Index database to create or update.
    pub index_path: PathBuf,
    /// Documents per embeddings request.
    pub batch_size: usize,
    /// Drop every indexed document before ingesting.
    pub rebuild: bool,
}

/// Result of the `ingest` pipeline.
#[derive(Debug)]
pub struct IngestResult {
    /// Documents built from the catalog.
    pub document_count: usize,
    /// Documents embedded and written in this run.
    pub embedded: usize,
    /// Documents skipped because their text and model were unchanged.
    pub unchanged: usize,
    /// Documents in the index after the run.
    pub indexed_total: usize,
    pub index_path: PathBuf,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each embeddings batch is written.
    fn batch_embedded(&self, done: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &IngestResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn batch_embedded(&self, _done: usize, _total: usize) {}
    fn done(&self, _result: &IngestResult) {}
}

/// SHA-256 of a document's text, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Run the full `ingest` pipeline.
///
/// 1. Load products and FAQs into documents
/// 2. Open (or create) the index, clearing it on rebuild
/// 3. Skip documents already indexed with the same text and model
/// 4. Embed the rest in batches and upsert them
#[instrument(skip_all, fields(index = %config.index_path.display(), rebuild = config.rebuild))]
pub async fn ingest<E: Embedder>(
    config: &IngestConfig,
    embedder: &E,
    progress: &dyn ProgressReporter,
) -> Result<IngestResult> {
    let start = Instant::now();

    // --- Phase 1: Catalog ---
    progress.phase("Loading catalog");
    let documents = catalog::load_catalog(&config.products_csv, &config.faqs_csv)?;

    // --- Phase 2: Storage ---
    progress.phase("Opening index");
    let storage = Storage::open(&config.index_path).await?;
    if config.rebuild {
        info!("clearing index for rebuild");
        storage.clear().await?;
    }

    // --- Phase 3: Change detection ---
    progress.phase("Checking for changes");
    let model_id = embedder.model_id().to_string();
    let mut pending: Vec<(CatalogDocument, String)> = Vec::new();
    for doc in documents.iter() {
        let hash = content_hash(&doc.content);
        if !storage.is_current(&doc.source, &hash, &model_id).await? {
            pending.push((doc.clone(), hash));
        }
    }
    let unchanged = documents.len() - pending.len();

    // --- Phase 4: Embed + write ---
    progress.phase("Embedding documents");
    let batch_size = config.batch_size.max(1);
    let mut embedded = 0;
    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|(d, _)| d.content.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(SalesAgentError::Provider(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                batch.len()
            )));
        }

        for ((doc, hash), embedding) in batch.iter().zip(vectors) {
            storage
                .upsert_document(&IndexedDocument {
                    source: doc.source.clone(),
                    content: doc.content.clone(),
                    content_hash: hash.clone(),
                    model_id: model_id.clone(),
                    embedding,
                })
                .await?;
        }

        embedded += batch.len();
        progress.batch_embedded(embedded, pending.len());
    }

    let result = IngestResult {
        document_count: documents.len(),
        embedded,
        unchanged,
        indexed_total: storage.document_count().await?,
        index_path: config.index_path.clone(),
        elapsed: start.elapsed(),
    };

    info!(
        documents = result.document_count,
        embedded = result.embedded,
        unchanged = result.unchanged,
        "ingest complete"
    );
    progress.done(&result);

    Ok(result)
}
