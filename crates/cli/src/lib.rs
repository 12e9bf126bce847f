//! # `policyrag` CLI Library Crate
//!
//! Core logic for the `policyrag` command-line tool: bulk ingestion of
//! policy documents into a local search index, and a `chunk` command that
//! prints how a single file would be split.

pub mod config;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crate::config::{get_config, AppConfig};
use policyrag::ingest::{DocumentAnalyzer, ExtensionRouter, IngestionPipeline};
use policyrag::providers::index::JsonlIndex;
use policyrag::{split_text, ExtractorSet, PageBlock};
use policyrag_pdf::PdfAnalyzer;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split, tag and index every file matching a glob pattern
    Ingest(IngestArgs),
    /// Print the sections a single file would be split into, as JSON lines
    Chunk(ChunkArgs),
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Files to ingest, e.g. "data/*.pdf".
    pub pattern: String,
    /// Path to a YAML configuration file. Defaults to ./policyrag.yml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding the JSON Lines index files.
    #[arg(long)]
    pub index_dir: Option<PathBuf>,
    /// Name of the index to write into.
    #[arg(long)]
    pub index_name: Option<String>,
    /// Category stored on every section.
    #[arg(long)]
    pub category: Option<String>,
    /// How many files to ingest at once.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct ChunkArgs {
    /// The file to split (.txt, .json layout dump or .pdf).
    pub file: PathBuf,
    /// Path to a YAML configuration file. Defaults to ./policyrag.yml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub max_section_length: Option<usize>,
    #[arg(long)]
    pub sentence_search_limit: Option<usize>,
    #[arg(long)]
    pub section_overlap: Option<usize>,
}

impl IngestArgs {
    /// Applies command-line overrides on top of the resolved configuration.
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = &self.index_dir {
            config.index.dir = dir.clone();
        }
        if let Some(name) = &self.index_name {
            config.index.name = name.clone();
        }
        if self.category.is_some() {
            config.category = self.category.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config
    }
}

impl ChunkArgs {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(max) = self.max_section_length {
            config.chunking.max_section_length = max;
        }
        if let Some(limit) = self.sentence_search_limit {
            config.chunking.sentence_search_limit = limit;
        }
        if let Some(overlap) = self.section_overlap {
            config.chunking.section_overlap = overlap;
        }
        config
    }
}

// --- Public Entrypoint ---

/// The main entry point for the `policyrag` library.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest(args) => handle_ingest(args).await,
        Commands::Chunk(args) => handle_chunk(args).await,
    }
}

/// Text, layout JSON and PDF files, dispatched by extension.
pub fn default_analyzer() -> ExtensionRouter {
    ExtensionRouter::with_local_defaults().route("pdf", PdfAnalyzer::new())
}

/// Expands a glob pattern into the matching files, sorted.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("Invalid glob pattern '{pattern}'"))? {
        let path = entry.context("Failed to read a path matched by the glob")?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Writes one JSON object per chunk to `out`.
pub fn write_chunks<W: Write>(
    pages: &[PageBlock],
    config: &AppConfig,
    extractors: &ExtractorSet,
    out: &mut W,
) -> Result<usize> {
    let mut count = 0;
    for chunk in split_text(pages, &config.chunking, extractors)? {
        serde_json::to_writer(&mut *out, &chunk)?;
        writeln!(out)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

// --- Command Handlers ---

/// Handles the `policyrag ingest` command logic.
async fn handle_ingest(args: IngestArgs) -> Result<()> {
    info!("Starting 'ingest' command with args: {:?}", args);
    let config = args.apply(get_config(args.config.as_deref())?);
    config.chunking.validate()?;

    let paths = expand_glob(&args.pattern)?;
    if paths.is_empty() {
        println!("No files match '{}'. Nothing to do.", args.pattern);
        return Ok(());
    }
    println!("Found {} files to ingest.", paths.len());

    let index = Arc::new(JsonlIndex::new(&config.index.dir, &config.index.name));
    let pipeline = IngestionPipeline::new(
        Arc::new(default_analyzer()),
        index.clone(),
        config.chunking.clone(),
        Arc::new(config.extractor_set()?),
    )
    .with_category(config.category.clone());

    pipeline.ensure_index().await?;

    let total = paths.len();
    let mut failures = 0;
    for (path, result) in pipeline.ingest_paths(paths, config.concurrency).await {
        match result {
            Ok(summary) => println!(
                "{}: {} pages, {} sections indexed",
                path.display(),
                summary.pages,
                summary.documents_added
            ),
            Err(e) => {
                error!("Failed to ingest '{}': {}", path.display(), e);
                failures += 1;
            }
        }
    }

    println!("Index written to '{}'.", index.path().display());
    if failures > 0 {
        return Err(anyhow!("{failures} of {total} files failed to ingest"));
    }
    Ok(())
}

/// Handles the `policyrag chunk` command logic.
async fn handle_chunk(args: ChunkArgs) -> Result<()> {
    let config = args.apply(get_config(args.config.as_deref())?);
    let extractors = config.extractor_set()?;

    let pages = default_analyzer()
        .analyze(&args.file)
        .await
        .with_context(|| format!("Failed to analyze '{}'", args.file.display()))?;

    let stdout = std::io::stdout();
    let count = write_chunks(&pages, &config, &extractors, &mut stdout.lock())?;
    info!("Wrote {} chunks for '{}'", count, args.file.display());
    Ok(())
}
