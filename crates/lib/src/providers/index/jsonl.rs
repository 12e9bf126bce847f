//! # JSON Lines Index
//!
//! A local, file-backed [`SearchIndex`]. Each index is a single
//! `<name>.jsonl` file in a directory, one section per line. Re-uploading a
//! section with the same `id` supersedes the earlier line when read back.

use crate::ingest::{IndexingResult, IngestError, SearchIndex, Section};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub struct JsonlIndex {
    dir: PathBuf,
    name: String,
    write_lock: Mutex<()>,
}

impl JsonlIndex {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.jsonl", self.name))
    }

    /// Reads back every stored section; the last line for an `id` wins.
    pub async fn read_all(&self) -> Result<Vec<Section>, IngestError> {
        let content = match tokio::fs::read_to_string(self.path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sections: Vec<Section> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let section: Section = serde_json::from_str(line).map_err(|e| {
                IngestError::Index(format!(
                    "Corrupt line {} in {}: {e}",
                    line_no + 1,
                    self.path().display()
                ))
            })?;
            match positions.get(&section.id) {
                Some(&pos) => sections[pos] = section,
                None => {
                    positions.insert(section.id.clone(), sections.len());
                    sections.push(section);
                }
            }
        }
        Ok(sections)
    }

    async fn create_if_missing(path: &Path) -> Result<bool, IngestError> {
        if tokio::fs::try_exists(path).await? {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::File::create(path).await?;
        Ok(true)
    }
}

#[async_trait]
impl SearchIndex for JsonlIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_index(&self) -> Result<bool, IngestError> {
        let _guard = self.write_lock.lock().await;
        Self::create_if_missing(&self.path()).await
    }

    async fn upload_documents(
        &self,
        batch: &[Section],
    ) -> Result<Vec<IndexingResult>, IngestError> {
        let mut buffer = String::new();
        for section in batch {
            let line = serde_json::to_string(section)
                .map_err(|e| IngestError::Index(format!("Failed to encode '{}': {e}", section.id)))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        let path = self.path();
        Self::create_if_missing(&path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        debug!(count = batch.len(), path = %path.display(), "Appended sections");

        Ok(batch
            .iter()
            .map(|s| IndexingResult {
                key: s.id.clone(),
                succeeded: true,
            })
            .collect())
    }
}
