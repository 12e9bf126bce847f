//! # Index Sections
//!
//! Converts chunks into the documents stored in the search index: stable
//! IDs, a source-page label, and identifiers carried forward from earlier
//! chunks of the same document.

use crate::chunking::Chunk;
use crate::extract::IdentifierKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One search index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(rename = "sourcepage")]
    pub source_page: String,
    #[serde(rename = "sourcefile")]
    pub source_file: String,
    #[serde(rename = "dni")]
    pub national_id: Option<String>,
    #[serde(rename = "cuit")]
    pub tax_id: Option<String>,
    #[serde(rename = "npoliza")]
    pub policy_number: Option<String>,
    /// Identifiers from deployment-specific extractors, keyed by field name.
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, String>,
}

/// Replaces every character outside `[0-9a-zA-Z_-]` with `_`.
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The label of the page a section came from.
///
/// PDFs are stored one page per blob (`<stem>-<page>.pdf`); any other file
/// is referenced by its base name.
pub fn source_page_label(filename: &str, page: usize) -> String {
    let path = Path::new(filename);
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if is_pdf {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(base);
        format!("{stem}-{page}.pdf")
    } else {
        base.to_string()
    }
}

/// Last-observed-value-wins carry of identifiers across a document's chunks.
#[derive(Debug, Clone, Default)]
pub struct IdentifierCarry {
    current: BTreeMap<IdentifierKind, String>,
}

impl IdentifierCarry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identifiers found in the next chunk and returns the
    /// values in effect for it.
    pub fn observe(
        &mut self,
        found: &BTreeMap<IdentifierKind, String>,
    ) -> &BTreeMap<IdentifierKind, String> {
        for (kind, value) in found {
            self.current.insert(kind.clone(), value.clone());
        }
        &self.current
    }
}

/// The identifiers in effect for each chunk after forward-fill.
pub fn forward_fill(chunks: &[Chunk]) -> Vec<BTreeMap<IdentifierKind, String>> {
    let mut carry = IdentifierCarry::new();
    chunks
        .iter()
        .map(|chunk| carry.observe(&chunk.identifiers).clone())
        .collect()
}

/// Prefixes the carried identifiers to the content, outermost last kind.
///
/// For the built-in kinds this yields `/Npoliza: X/ /CUIT: Y/ /DNI: Z/ text`.
fn tag_content(text: &str, identifiers: &BTreeMap<IdentifierKind, String>) -> String {
    identifiers
        .iter()
        .fold(text.to_string(), |content, (kind, value)| {
            format!("/{}: {}/ {}", kind.label(), value, content)
        })
}

/// Builds the index documents for one file.
pub fn create_sections<I>(filename: &str, chunks: I, category: Option<&str>) -> Vec<Section>
where
    I: IntoIterator<Item = Chunk>,
{
    let mut carry = IdentifierCarry::new();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let identifiers = carry.observe(&chunk.identifiers);
            let extra = identifiers
                .iter()
                .filter(|(kind, _)| matches!(kind, IdentifierKind::Custom(_)))
                .map(|(kind, value)| (kind.field_name().to_string(), value.clone()))
                .collect();

            Section {
                id: sanitize_id(&format!("{filename}-{i}")),
                content: tag_content(&chunk.text, identifiers),
                category: category.map(String::from),
                source_page: source_page_label(filename, chunk.page_index),
                source_file: filename.to_string(),
                national_id: identifiers.get(&IdentifierKind::NationalId).cloned(),
                tax_id: identifiers.get(&IdentifierKind::TaxId).cloned(),
                policy_number: identifiers.get(&IdentifierKind::PolicyNumber).cloned(),
                extra,
            }
        })
        .collect()
}
