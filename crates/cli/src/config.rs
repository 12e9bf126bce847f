//! # Application Configuration
//!
//! Defines the configuration for the `policyrag` CLI and loads it in layers:
//! programmatic defaults, an optional YAML file, then `POLICYRAG_` prefixed
//! environment variables. Command-line flags are applied on top by the
//! command handlers.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use policyrag::constants::{DEFAULT_INDEX_DIR, DEFAULT_INDEX_NAME};
use policyrag::{ChunkerConfig, ExtractorSet, IdentifierKind, RegexExtractor};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// The file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "policyrag.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid pattern for extractor '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Where the local JSON Lines index lives.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_index_name")]
    pub name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
            name: default_index_name(),
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_DIR)
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_concurrency() -> usize {
    4
}

/// A deployment-specific identifier, added after the built-in insurance ones.
///
/// Using a built-in field name (`dni`, `cuit`, `npoliza`) lets a match
/// replace the built-in value for that chunk.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub name: String,
    pub patterns: Vec<String>,
}

/// The root configuration structure, mapping directly to `policyrag.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub chunking: ChunkerConfig,
    #[serde(default)]
    pub index: IndexConfig,
    /// Stored on every section as `category`.
    #[serde(default)]
    pub category: Option<String>,
    /// How many files are ingested at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub extractors: Vec<ExtractorConfig>,
}

impl AppConfig {
    /// The built-in insurance extractors followed by the configured ones.
    pub fn extractor_set(&self) -> Result<ExtractorSet, ConfigError> {
        let mut set = ExtractorSet::insurance().map_err(|source| ConfigError::Pattern {
            name: "insurance".to_string(),
            source,
        })?;
        for extractor in &self.extractors {
            let patterns: Vec<&str> = extractor.patterns.iter().map(String::as_str).collect();
            let kind = IdentifierKind::from(extractor.name.as_str());
            let regex_extractor =
                RegexExtractor::new(kind, &patterns).map_err(|source| ConfigError::Pattern {
                    name: extractor.name.clone(),
                    source,
                })?;
            set = set.with(regex_extractor);
        }
        Ok(set)
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the configuration from an optional YAML file and the environment.
///
/// - With `config_path_override`, that file must exist.
/// - Otherwise `policyrag.yml` in the working directory is used if present.
/// - Keys are overridden by `POLICYRAG_...` variables, with `__` between
///   nesting levels (e.g. `POLICYRAG_CHUNKING__SECTION_OVERLAP`).
pub fn get_config(config_path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
    // Layer 1: Programmatic defaults from the library.
    let mut builder = ConfigBuilder::builder()
        .set_default("index.dir", DEFAULT_INDEX_DIR)?
        .set_default("index.name", DEFAULT_INDEX_NAME)?
        .set_default("concurrency", default_concurrency() as i64)?;

    // Layer 2: YAML file (optional unless explicitly requested).
    let content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{}'.", path.display()))
        })?),
        None => read_and_substitute(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(content) = content {
        info!(
            "Loading configuration from '{}'.",
            config_path_override
                .unwrap_or(Path::new(DEFAULT_CONFIG_FILE))
                .display()
        );
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 3: Prefixed environment variables for overrides.
        .add_source(
            Environment::with_prefix("POLICYRAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
