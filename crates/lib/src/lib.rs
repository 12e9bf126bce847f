//! # policyrag
//!
//! Ingestion core for a retrieval-augmented assistant over insurance
//! policies. Documents arrive as pages of text, are split into overlapping,
//! boundary-aware sections, tagged with the customer and policy identifiers
//! found in them, and loaded into a search index.

pub mod chunking;
pub mod constants;
pub mod errors;
pub mod extract;
pub mod ingest;
pub mod layout;
pub mod providers;

pub use chunking::{split_text, Chunk, Chunker, ChunkerConfig, Chunks, PageBlock};
pub use errors::ChunkError;
pub use extract::{ExtractorSet, IdentifierExtractor, IdentifierKind, RegexExtractor};
