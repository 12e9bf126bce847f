//! The sliding-window section splitter.
//!
//! A single forward pass over the concatenated page text, driven by a
//! `start` cursor. Each step picks an end boundary ahead of the cursor, snaps
//! the start back to a sentence or word boundary, emits the section, and
//! moves the cursor to `end - overlap` (or to the start of an unclosed table).

use super::{page_for_offset, page_starts, table, validate_pages, Chunk, ChunkerConfig, PageBlock};
use crate::errors::ChunkError;
use crate::extract::ExtractorSet;
use tracing::{debug, warn};

/// Splits documents with a fixed configuration and extractor set.
#[derive(Debug, Clone, Copy)]
pub struct Chunker<'a> {
    config: &'a ChunkerConfig,
    extractors: &'a ExtractorSet,
}

impl<'a> Chunker<'a> {
    pub fn new(config: &'a ChunkerConfig, extractors: &'a ExtractorSet) -> Self {
        Self { config, extractors }
    }

    /// Validates the input and returns the lazy section sequence.
    ///
    /// Fails with [`ChunkError::InvalidInput`] when the blocks are not
    /// contiguous and ordered, before any section is produced.
    pub fn split(&self, pages: &[PageBlock]) -> Result<Chunks<'a>, ChunkError> {
        self.config.validate()?;
        validate_pages(pages)?;

        let text: Vec<char> = pages.iter().flat_map(|p| p.text.chars()).collect();
        let page_starts = page_starts(pages);
        let end = text.len();

        Ok(Chunks {
            config: self.config,
            extractors: self.extractors,
            text,
            page_starts,
            start: 0,
            end,
            finished: false,
        })
    }
}

/// Shorthand for `Chunker::new(config, extractors).split(pages)`.
pub fn split_text<'a>(
    pages: &[PageBlock],
    config: &'a ChunkerConfig,
    extractors: &'a ExtractorSet,
) -> Result<Chunks<'a>, ChunkError> {
    Chunker::new(config, extractors).split(pages)
}

/// The section sequence of one document. Finite and single-pass.
#[derive(Debug)]
pub struct Chunks<'a> {
    config: &'a ChunkerConfig,
    extractors: &'a ExtractorSet,
    text: Vec<char>,
    /// `(start_offset, page_index)` per block, ordered by offset.
    page_starts: Vec<(usize, usize)>,
    start: usize,
    end: usize,
    finished: bool,
}

impl Chunks<'_> {
    /// Total document length in characters.
    pub fn document_len(&self) -> usize {
        self.text.len()
    }

    /// Pushes `start + max_section_length` forward to a sentence ending, or
    /// back to the last word break seen, within `sentence_search_limit`.
    fn find_end(&self, start: usize) -> usize {
        let length = self.text.len();
        let max = self.config.max_section_length;
        let limit = self.config.sentence_search_limit;

        let mut end = start + max;
        if end > length {
            end = length;
        } else {
            let mut last_word = None;
            while end < length
                && end - start - max < limit
                && !self.config.is_sentence_ending(self.text[end])
            {
                if self.config.is_word_break(self.text[end]) {
                    last_word = Some(end);
                }
                end += 1;
            }
            if end < length && !self.config.is_sentence_ending(self.text[end]) {
                if let Some(word) = last_word {
                    end = word;
                }
            }
        }
        // Keep the terminator (or break) in this section.
        if end < length {
            end += 1;
        }
        end
    }

    /// Walks back from the cursor to just after a sentence ending, bounded
    /// by `end - max_section_length - 2 * sentence_search_limit`, falling
    /// back to just after the earliest word break seen.
    fn find_start(&self, cursor: usize, end: usize) -> usize {
        let window = self.config.max_section_length + 2 * self.config.sentence_search_limit;
        let floor = end.saturating_sub(window);

        let mut start = cursor;
        let mut last_word = None;
        while start > 0 && start > floor && !self.config.is_sentence_ending(self.text[start]) {
            if self.config.is_word_break(self.text[start]) {
                last_word = Some(start);
            }
            start -= 1;
        }
        if !self.config.is_sentence_ending(self.text[start]) {
            if let Some(word) = last_word {
                start = word;
            }
        }
        if start > 0 {
            start += 1;
        }
        start
    }

    /// Where the cursor goes after emitting `[start, end)`.
    fn next_cursor(&self, start: usize, end: usize) -> usize {
        let overlap_cursor = end - self.config.section_overlap;
        let threshold = 2 * self.config.sentence_search_limit;

        match table::unclosed_table_offset(&self.text[start..end]) {
            Some(table_start) if table_start > threshold => {
                let table_cursor = overlap_cursor.min(start + table_start);
                if table_cursor > self.start {
                    warn!(
                        "Section ends with unclosed table, starting next section with the table at page {} offset {} table start {}",
                        self.page_at(start),
                        start,
                        table_start
                    );
                    table_cursor
                } else {
                    warn!(
                        "Unclosed table at offset {} would not advance past cursor {}, using normal overlap",
                        start + table_start,
                        self.start
                    );
                    overlap_cursor
                }
            }
            _ => overlap_cursor,
        }
    }

    fn page_at(&self, offset: usize) -> usize {
        page_for_offset(&self.page_starts, offset).unwrap_or_default()
    }

    fn emit(&self, start: usize, end: usize) -> Chunk {
        let text: String = self.text[start..end].iter().collect();
        let identifiers = self.extractors.extract_all(&text).collect();
        let page_index = self.page_at(start);
        debug!(start, end, page_index, "emitting section");
        Chunk {
            text,
            page_index,
            start_offset: start,
            end_offset: end,
            identifiers,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.finished {
            return None;
        }
        let overlap = self.config.section_overlap;

        if self.start + overlap < self.text.len() {
            let end = self.find_end(self.start);
            let start = self.find_start(self.start, end);
            let chunk = self.emit(start, end);
            self.start = self.next_cursor(start, end);
            self.end = end;
            return Some(chunk);
        }

        // The loop only stops once the cursor plus overlap reaches the
        // document end, so no tail is left unemitted after the last section.
        debug_assert!(
            self.start + overlap >= self.end,
            "tail [{}, {}) left after the last section",
            self.start,
            self.end
        );
        self.finished = true;
        None
    }
}
