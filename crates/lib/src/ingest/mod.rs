//! # Ingestion Logic
//!
//! This module provides the pipeline that takes source files through layout
//! analysis, section chunking and identifier tagging, and loads the
//! resulting sections into a search index.

pub mod analyzers;

pub mod pipeline;

pub mod sections;

pub mod traits;

pub use analyzers::{ExtensionRouter, LayoutFileAnalyzer, TextFileAnalyzer};
pub use pipeline::IngestionPipeline;
pub use sections::{
    create_sections, forward_fill, sanitize_id, source_page_label, IdentifierCarry, Section,
};
pub use traits::{DocumentAnalyzer, IndexingResult, IngestError, IngestionResult, SearchIndex};

use crate::constants::INDEX_BATCH_SIZE;
use tracing::info;

/// Uploads sections in batches of [`INDEX_BATCH_SIZE`].
///
/// Returns the number of sections the index reported as succeeded.
pub async fn index_sections(
    index: &dyn SearchIndex,
    sections: &[Section],
) -> Result<usize, IngestError> {
    let mut succeeded_total = 0;
    for batch in sections.chunks(INDEX_BATCH_SIZE) {
        let results = index.upload_documents(batch).await?;
        let succeeded = results.iter().filter(|r| r.succeeded).count();
        info!(
            "Indexed {} sections, {} succeeded",
            results.len(),
            succeeded
        );
        succeeded_total += succeeded;
    }
    Ok(succeeded_total)
}
