//! Search index providers.

pub mod jsonl;

pub use jsonl::JsonlIndex;
