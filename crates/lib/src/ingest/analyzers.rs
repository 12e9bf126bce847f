//! Bundled [`DocumentAnalyzer`] implementations for local files.

use super::traits::{DocumentAnalyzer, IngestError};
use crate::chunking::{pages_from_texts, PageBlock};
use crate::layout::{build_page_blocks, AnalyzedDocument};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads a file, reporting a missing file as [`IngestError::SourceNotFound`].
pub async fn read_source(path: &Path) -> Result<Vec<u8>, IngestError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => IngestError::SourceNotFound(path.display().to_string()),
        _ => IngestError::Io(e),
    })
}

/// Plain text. Form feeds (`\x0c`) separate pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileAnalyzer;

impl TextFileAnalyzer {
    pub fn pages_from_str(text: &str) -> Vec<PageBlock> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut pages: Vec<&str> = text.split('\u{c}').collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
            pages.pop();
        }
        pages_from_texts(pages.into_iter().map(|p| format!("{p} ")))
    }
}

#[async_trait]
impl DocumentAnalyzer for TextFileAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Vec<PageBlock>, IngestError> {
        let bytes = read_source(path).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| IngestError::Parse(format!("{} is not UTF-8: {e}", path.display())))?;
        Ok(Self::pages_from_str(&text))
    }
}

/// A JSON dump of a layout service result (see [`AnalyzedDocument`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutFileAnalyzer;

#[async_trait]
impl DocumentAnalyzer for LayoutFileAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Vec<PageBlock>, IngestError> {
        let bytes = read_source(path).await?;
        let doc: AnalyzedDocument = serde_json::from_slice(&bytes).map_err(|e| {
            IngestError::Parse(format!("Invalid layout JSON in {}: {e}", path.display()))
        })?;
        debug!(
            pages = doc.pages.len(),
            tables = doc.tables.len(),
            "Loaded layout result"
        );
        Ok(build_page_blocks(&doc)?)
    }
}

/// Dispatches to an analyzer by file extension (case-insensitive).
#[derive(Default, Clone)]
pub struct ExtensionRouter {
    routes: HashMap<String, Arc<dyn DocumentAnalyzer>>,
}

impl ExtensionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `.txt` and `.json` layout dumps.
    pub fn with_local_defaults() -> Self {
        Self::new()
            .route("txt", TextFileAnalyzer)
            .route("json", LayoutFileAnalyzer)
    }

    pub fn route(mut self, extension: &str, analyzer: impl DocumentAnalyzer + 'static) -> Self {
        self.routes
            .insert(extension.to_ascii_lowercase(), Arc::new(analyzer));
        self
    }

    fn analyzer_for(&self, path: &Path) -> Option<&Arc<dyn DocumentAnalyzer>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.routes.get(&ext)
    }
}

#[async_trait]
impl DocumentAnalyzer for ExtensionRouter {
    async fn analyze(&self, path: &Path) -> Result<Vec<PageBlock>, IngestError> {
        match self.analyzer_for(path) {
            Some(analyzer) => analyzer.analyze(path).await,
            None => {
                warn!("No analyzer registered for '{}'", path.display());
                Err(IngestError::Parse(format!(
                    "Unsupported file type: {}",
                    path.display()
                )))
            }
        }
    }
}
