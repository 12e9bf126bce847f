//! # Section Chunking
//!
//! Splits a document, laid out end to end as a sequence of [`PageBlock`]s,
//! into overlapping sections for the search index. Sections prefer to end on
//! a sentence boundary, fall back to a word boundary, and never leave a
//! table open when it can be carried into the next section instead.
//!
//! All offsets are measured in characters of the concatenated page text.

pub mod config;
pub mod splitter;
pub mod table;

pub use config::ChunkerConfig;
pub use splitter::{split_text, Chunker, Chunks};

use crate::errors::ChunkError;
use crate::extract::IdentifierKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of extracted text and where it begins in the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBlock {
    /// Zero-based page number.
    pub page_index: usize,
    /// Offset of this page's first character in the concatenated text.
    pub start_offset: usize,
    /// The page text. Tables may be embedded as literal HTML markup.
    pub text: String,
}

impl PageBlock {
    pub fn new(page_index: usize, start_offset: usize, text: impl Into<String>) -> Self {
        Self {
            page_index,
            start_offset,
            text: text.into(),
        }
    }

    /// Length of the page text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn end_offset(&self) -> usize {
        self.start_offset + self.char_len()
    }
}

/// Lays out page texts end to end, numbering pages from zero.
pub fn pages_from_texts<I, S>(texts: I) -> Vec<PageBlock>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut offset = 0;
    texts
        .into_iter()
        .enumerate()
        .map(|(page_index, text)| {
            let block = PageBlock::new(page_index, offset, text);
            offset = block.end_offset();
            block
        })
        .collect()
}

/// Checks that blocks start at zero, are contiguous, and are ordered by page.
pub fn validate_pages(pages: &[PageBlock]) -> Result<(), ChunkError> {
    let Some(first) = pages.first() else {
        return Ok(());
    };
    if first.start_offset != 0 {
        return Err(ChunkError::InvalidInput(format!(
            "first page {} starts at offset {} instead of 0",
            first.page_index, first.start_offset
        )));
    }
    for pair in pages.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.page_index <= prev.page_index {
            return Err(ChunkError::InvalidInput(format!(
                "page {} follows page {}",
                next.page_index, prev.page_index
            )));
        }
        let expected = prev.end_offset();
        if next.start_offset != expected {
            return Err(ChunkError::InvalidInput(format!(
                "page {} starts at offset {} but page {} ends at {}",
                next.page_index, next.start_offset, prev.page_index, expected
            )));
        }
    }
    Ok(())
}

/// The page containing `offset`: the last block starting at or before it,
/// or the final block when the offset lies past every recorded start.
pub fn find_page(pages: &[PageBlock], offset: usize) -> Option<usize> {
    page_for_offset(&page_starts(pages), offset)
}

/// `(start_offset, page_index)` per block, in block order.
pub(crate) fn page_starts(pages: &[PageBlock]) -> Vec<(usize, usize)> {
    pages.iter().map(|p| (p.start_offset, p.page_index)).collect()
}

pub(crate) fn page_for_offset(page_starts: &[(usize, usize)], offset: usize) -> Option<usize> {
    let idx = page_starts.partition_point(|&(start, _)| start <= offset);
    page_starts
        .get(idx.saturating_sub(1))
        .map(|&(_, page)| page)
}

/// A contiguous slice of the document prepared for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Page containing `start_offset`.
    pub page_index: usize,
    pub start_offset: usize,
    /// Exclusive.
    pub end_offset: usize,
    /// Identifiers found in this chunk's own text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<IdentifierKind, String>,
}

impl Chunk {
    pub fn identifier(&self, kind: &IdentifierKind) -> Option<&str> {
        self.identifiers.get(kind).map(String::as_str)
    }

    pub fn national_id(&self) -> Option<&str> {
        self.identifier(&IdentifierKind::NationalId)
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.identifier(&IdentifierKind::TaxId)
    }

    pub fn policy_number(&self) -> Option<&str> {
        self.identifier(&IdentifierKind::PolicyNumber)
    }

    /// Length of the chunk text in characters.
    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}
