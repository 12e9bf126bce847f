//! # policyrag-pdf: PDF Analyzer Plugin
//!
//! This crate provides local text extraction for PDF policies, acting as a
//! plugin for the `policyrag` pipeline. It implements the `DocumentAnalyzer`
//! trait from `policyrag`, producing one page block per PDF page.

use policyrag::{
    chunking::{pages_from_texts, PageBlock},
    ingest::{analyzers::read_source, DocumentAnalyzer, IngestError},
};
use async_trait::async_trait;
use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum PdfIngestError {
    #[error("Failed to parse PDF content: {0}")]
    PdfParse(String),
    #[error("An internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PdfIngestError> for IngestError {
    fn from(err: PdfIngestError) -> Self {
        match err {
            PdfIngestError::PdfParse(s) => IngestError::Parse(s),
            PdfIngestError::Internal(e) => IngestError::Internal(e),
        }
    }
}

// --- Core Extraction Logic ---

/// Extracts the text of every page of a PDF synchronously, one string per page.
pub fn extract_page_texts(pdf_data: &[u8]) -> Result<Vec<String>, PdfIngestError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PdfIngestError::PdfParse(e.to_string()))?;
    let resolver = file.resolver();
    let mut pages = Vec::with_capacity(file.num_pages() as usize);

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PdfIngestError::PdfParse(e.to_string()))?;
        let mut page_text = String::new();
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| PdfIngestError::PdfParse(e.to_string()))?;
            for op in operations.iter() {
                match op {
                    Op::TextDraw { text } => page_text.push_str(&text.to_string_lossy()),
                    Op::TextDrawAdjusted { array } => {
                        for item in array {
                            if let TextDrawAdjusted::Text(text) = item {
                                page_text.push_str(&text.to_string_lossy());
                            }
                        }
                    }
                    Op::TextNewline | Op::EndText => {
                        if !page_text.is_empty() && !page_text.ends_with(' ') {
                            page_text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
        }
        debug!(page = page_num, chars = page_text.chars().count(), "Extracted PDF page");
        pages.push(page_text);
    }
    Ok(pages)
}

/// Builds the chunker's page blocks from raw PDF bytes.
///
/// Each page is followed by a space so words never fuse across a page break.
pub fn pages_from_pdf(pdf_data: &[u8]) -> Result<Vec<PageBlock>, PdfIngestError> {
    let texts = extract_page_texts(pdf_data)?;
    Ok(pages_from_texts(texts.into_iter().map(|t| format!("{t} "))))
}

// --- Analyzer Implementation ---

/// The `DocumentAnalyzer` implementation for PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfAnalyzer;

impl PdfAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentAnalyzer for PdfAnalyzer {
    #[instrument(skip(self))]
    async fn analyze(&self, path: &Path) -> Result<Vec<PageBlock>, IngestError> {
        let pdf_data = read_source(path).await?;
        info!(
            "Extracting text from '{}' ({} bytes)",
            path.display(),
            pdf_data.len()
        );

        // PDF parsing is CPU-bound; keep it off the async workers.
        let pages = tokio::task::spawn_blocking(move || pages_from_pdf(&pdf_data))
            .await
            .map_err(|e| {
                IngestError::Internal(anyhow::anyhow!("Tokio join error while parsing PDF: {e}"))
            })??;

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            warn!(
                "PDF '{}' has no extractable text; it may need OCR.",
                path.display()
            );
        }
        Ok(pages)
    }
}
