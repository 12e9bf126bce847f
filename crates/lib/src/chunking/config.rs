use crate::constants::{
    MAX_SECTION_LENGTH, SECTION_OVERLAP, SENTENCE_ENDINGS, SENTENCE_SEARCH_LIMIT, WORD_BREAKS,
};
use crate::errors::ChunkError;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the section splitter.
///
/// All lengths are in characters. The defaults are the values the production
/// index was built with; tests use much smaller ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Soft target length of a section.
    pub max_section_length: usize,
    /// How far past the target (and before the start) to look for a sentence ending.
    pub sentence_search_limit: usize,
    /// Characters carried over into the start of the next section.
    pub section_overlap: usize,
    pub sentence_endings: Vec<char>,
    pub word_breaks: Vec<char>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_section_length: MAX_SECTION_LENGTH,
            sentence_search_limit: SENTENCE_SEARCH_LIMIT,
            section_overlap: SECTION_OVERLAP,
            sentence_endings: SENTENCE_ENDINGS.to_vec(),
            word_breaks: WORD_BREAKS.to_vec(),
        }
    }
}

impl ChunkerConfig {
    /// Default boundaries with custom lengths.
    pub fn with_lengths(
        max_section_length: usize,
        sentence_search_limit: usize,
        section_overlap: usize,
    ) -> Self {
        Self {
            max_section_length,
            sentence_search_limit,
            section_overlap,
            ..Self::default()
        }
    }

    /// Rejects configurations under which the cursor could stop advancing.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_section_length == 0 {
            return Err(ChunkError::InvalidConfig(
                "max_section_length must be greater than zero".to_string(),
            ));
        }
        if self.section_overlap >= self.max_section_length {
            return Err(ChunkError::InvalidConfig(format!(
                "section_overlap ({}) must be smaller than max_section_length ({})",
                self.section_overlap, self.max_section_length
            )));
        }
        Ok(())
    }

    pub(crate) fn is_sentence_ending(&self, c: char) -> bool {
        self.sentence_endings.contains(&c)
    }

    pub(crate) fn is_word_break(&self, c: char) -> bool {
        self.word_breaks.contains(&c)
    }
}
