//! # Ingestion Pipeline
//!
//! Orchestrates analyze → chunk → tag → index for each source file. Files
//! are independent: each gets its own chunker on a blocking task, and
//! several files may be in flight at once.

use super::index_sections;
use super::sections::{create_sections, Section};
use super::traits::{DocumentAnalyzer, IngestError, IngestionResult, SearchIndex};
use crate::chunking::{split_text, ChunkerConfig};
use crate::errors::ChunkError;
use crate::extract::ExtractorSet;
use anyhow::anyhow;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct IngestionPipeline {
    analyzer: Arc<dyn DocumentAnalyzer>,
    index: Arc<dyn SearchIndex>,
    config: ChunkerConfig,
    extractors: Arc<ExtractorSet>,
    category: Option<String>,
}

impl IngestionPipeline {
    pub fn new(
        analyzer: Arc<dyn DocumentAnalyzer>,
        index: Arc<dyn SearchIndex>,
        config: ChunkerConfig,
        extractors: Arc<ExtractorSet>,
    ) -> Self {
        Self {
            analyzer,
            index,
            config,
            extractors,
            category: None,
        }
    }

    /// Sets the `category` stored on every section.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Makes sure the target index exists before any upload.
    pub async fn ensure_index(&self) -> Result<(), IngestError> {
        info!("Ensuring search index {} exists", self.index.name());
        if self.index.ensure_index().await? {
            info!("Created {} search index", self.index.name());
        } else {
            info!("Search index {} already exists", self.index.name());
        }
        Ok(())
    }

    /// Analyzes, splits and indexes a single file.
    #[instrument(skip(self), fields(index = self.index.name()))]
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestionResult, IngestError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IngestError::SourceNotFound(path.display().to_string()))?
            .to_string();
        info!("Processing: {}", path.display());

        let pages = self.analyzer.analyze(path).await?;
        let page_count = pages.len();
        if page_count == 0 {
            warn!("Analysis of '{}' produced no pages.", filename);
        }

        info!("Splitting '{}' into sections", filename);
        let config = self.config.clone();
        let extractors = Arc::clone(&self.extractors);
        let category = self.category.clone();
        let source = filename.clone();
        let sections: Vec<Section> =
            tokio::task::spawn_blocking(move || -> Result<Vec<Section>, ChunkError> {
                let chunks = split_text(&pages, &config, &extractors)?;
                Ok(create_sections(&source, chunks, category.as_deref()))
            })
            .await
            .map_err(|e| {
                IngestError::Internal(anyhow!("Tokio join error while chunking: {e}"))
            })??;

        if sections.is_empty() {
            warn!(
                "'{}' is too short to produce any section; nothing to index.",
                filename
            );
        }

        info!(
            "Indexing sections from '{}' into search index '{}'",
            filename,
            self.index.name()
        );
        let documents_added = index_sections(self.index.as_ref(), &sections).await?;

        Ok(IngestionResult {
            source: filename,
            pages: page_count,
            documents_added,
            document_ids: sections.into_iter().map(|s| s.id).collect(),
        })
    }

    /// Ingests many files, at most `concurrency` at a time.
    ///
    /// Results come back in completion order, each paired with its path; a
    /// failing file does not stop the others.
    pub async fn ingest_paths(
        &self,
        paths: Vec<PathBuf>,
        concurrency: usize,
    ) -> Vec<(PathBuf, Result<IngestionResult, IngestError>)> {
        stream::iter(paths)
            .map(|path| async move {
                let result = self.ingest_file(&path).await;
                (path, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
