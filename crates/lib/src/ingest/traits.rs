use super::sections::Section;
use crate::chunking::PageBlock;
use crate::errors::ChunkError;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// A generic error type for the ingestion pipeline and its collaborators.
///
/// Analyzers and index providers map their specific failures (PDF parsing,
/// JSON decoding, I/O) into these variants so the pipeline can report every
/// document failure the same way.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("The specified source could not be found: {0}")]
    SourceNotFound(String),

    #[error("Failed to fetch or read content from the source: {0}")]
    Fetch(String),

    #[error("Failed to parse the content from the source: {0}")]
    Parse(String),

    #[error("Failed to split the document into sections: {0}")]
    Chunking(#[from] ChunkError),

    #[error("A search index operation failed: {0}")]
    Index(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An unexpected internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Summary of one ingested document.
#[derive(Debug, Clone, Default)]
pub struct IngestionResult {
    /// The file name the sections were attributed to.
    pub source: String,
    /// Number of pages the analyzer produced.
    pub pages: usize,
    /// Number of sections the index accepted.
    pub documents_added: usize,
    /// IDs of every section sent to the index, in order.
    pub document_ids: Vec<String>,
}

/// Outcome of a single document upload, as reported by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingResult {
    pub key: String,
    pub succeeded: bool,
}

/// The layout/OCR collaborator: turns a source file into page blocks.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, path: &Path) -> Result<Vec<PageBlock>, IngestError>;
}

/// The indexing collaborator.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// The name of the index sections are written into.
    fn name(&self) -> &str;

    /// Creates the index if it does not exist yet. Returns `true` when it was created.
    async fn ensure_index(&self) -> Result<bool, IngestError>;

    /// Uploads (or replaces, by `id`) one batch of sections.
    async fn upload_documents(&self, batch: &[Section])
        -> Result<Vec<IndexingResult>, IngestError>;
}
