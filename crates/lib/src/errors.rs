use thiserror::Error;

/// Errors raised while preparing or splitting a document.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("Invalid page layout: {0}")]
    InvalidInput(String),
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
