//! # Shared Constants
//!
//! Defaults shared across the `policyrag` workspace. The chunking values are
//! the ones the production index was built with; deployments override them
//! through `ChunkerConfig`.

/// The soft target length of a single section, in characters.
pub const MAX_SECTION_LENGTH: usize = 1000;

/// How far past (or before) the target boundary to look for a sentence ending.
pub const SENTENCE_SEARCH_LIMIT: usize = 100;

/// Characters repeated at the start of the next section.
pub const SECTION_OVERLAP: usize = 100;

/// Characters that end a sentence.
pub const SENTENCE_ENDINGS: [char; 3] = ['.', '!', '?'];

/// Characters accepted as a fallback cut point when no sentence ending is in reach.
pub const WORD_BREAKS: [char; 12] = [
    ',', ';', ':', ' ', '(', ')', '[', ']', '{', '}', '\t', '\n',
];

/// Opening table marker emitted by the layout conversion.
pub const TABLE_OPEN_MARKER: &str = "<table";

/// Closing table marker emitted by the layout conversion.
pub const TABLE_CLOSE_MARKER: &str = "</table";

/// Maximum number of sections sent to the search index in a single upload.
pub const INDEX_BATCH_SIZE: usize = 1000;

/// The default directory for the local JSON-lines index.
pub const DEFAULT_INDEX_DIR: &str = "db/index";

/// The default index name.
pub const DEFAULT_INDEX_NAME: &str = "policies";
