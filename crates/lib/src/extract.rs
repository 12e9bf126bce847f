//! # Identifier Extraction
//!
//! Pluggable matchers that pull customer and policy identifiers out of a
//! chunk's text. The chunker only depends on the [`IdentifierExtractor`]
//! trait; the patterns below are the ones used by the deployed index.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// DNI, as printed on policy schedules.
pub const DNI_PATTERNS: &[&str] = &[r"D\.N\.I\.\s*(\d{8})", r"PRUER\s*(\d{8})"];

/// CUIT, with the OCR variant where the holder marker lands between label and number.
pub const CUIT_PATTERNS: &[&str] = &[
    r"C\.U\.I\.T\.\s*(\d{2}-\d{8}-\d)",
    r"C\.U\.I\.T\. PRUER\s*(\d{2}-\d{8}-\d)",
];

/// Policy number, e.g. `PÓLIZA N° 123-45678901-00`.
pub const POLICY_NUMBER_PATTERNS: &[&str] = &[
    r"(?i)(?:PÓLIZA(?:\sN°)?\s)?(\d{3}-\d{8}-\d{2})",
    r"(?i)PÓLIZA\sN°\s(\d{3}-\d{8}-\d{2})",
];

/// The kind of identifier an extractor produces.
///
/// The well-known kinds map to the index fields `dni`, `cuit` and `npoliza`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentifierKind {
    NationalId,
    TaxId,
    PolicyNumber,
    Custom(String),
}

impl IdentifierKind {
    /// The index field name for this kind.
    pub fn field_name(&self) -> &str {
        match self {
            IdentifierKind::NationalId => "dni",
            IdentifierKind::TaxId => "cuit",
            IdentifierKind::PolicyNumber => "npoliza",
            IdentifierKind::Custom(name) => name,
        }
    }

    /// The label used when the identifier is prefixed to a section's content.
    pub fn label(&self) -> &str {
        match self {
            IdentifierKind::NationalId => "DNI",
            IdentifierKind::TaxId => "CUIT",
            IdentifierKind::PolicyNumber => "Npoliza",
            IdentifierKind::Custom(name) => name,
        }
    }
}

impl From<&str> for IdentifierKind {
    fn from(name: &str) -> Self {
        match name {
            "dni" => IdentifierKind::NationalId,
            "cuit" => IdentifierKind::TaxId,
            "npoliza" => IdentifierKind::PolicyNumber,
            other => IdentifierKind::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl Serialize for IdentifierKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.field_name())
    }
}

impl<'de> Deserialize<'de> for IdentifierKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(IdentifierKind::from(name.as_str()))
    }
}

/// Given a chunk of text, return the identifier it contains, if any.
pub trait IdentifierExtractor: Send + Sync {
    fn kind(&self) -> IdentifierKind;

    fn extract(&self, text: &str) -> Option<String>;
}

/// An extractor backed by an ordered list of regular expressions.
///
/// Patterns are tried in order and the first one that matches wins. The
/// value is capture group 1, or the whole match for patterns without groups.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    kind: IdentifierKind,
    patterns: Vec<Regex>,
}

impl RegexExtractor {
    pub fn new(kind: IdentifierKind, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kind, patterns })
    }

    pub fn national_id() -> Result<Self, regex::Error> {
        Self::new(IdentifierKind::NationalId, DNI_PATTERNS)
    }

    pub fn tax_id() -> Result<Self, regex::Error> {
        Self::new(IdentifierKind::TaxId, CUIT_PATTERNS)
    }

    pub fn policy_number() -> Result<Self, regex::Error> {
        Self::new(IdentifierKind::PolicyNumber, POLICY_NUMBER_PATTERNS)
    }
}

impl IdentifierExtractor for RegexExtractor {
    fn kind(&self) -> IdentifierKind {
        self.kind.clone()
    }

    fn extract(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| m.as_str().to_string())
        })
    }
}

/// The ordered set of extractors applied to every chunk.
#[derive(Default)]
pub struct ExtractorSet {
    extractors: Vec<Box<dyn IdentifierExtractor>>,
}

impl ExtractorSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// DNI, CUIT and policy number, in that order.
    pub fn insurance() -> Result<Self, regex::Error> {
        Ok(Self::empty()
            .with(RegexExtractor::national_id()?)
            .with(RegexExtractor::tax_id()?)
            .with(RegexExtractor::policy_number()?))
    }

    pub fn with(mut self, extractor: impl IdentifierExtractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Runs every extractor over `text`, yielding the kinds that matched.
    pub fn extract_all<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (IdentifierKind, String)> + 'a {
        self.extractors
            .iter()
            .filter_map(move |e| e.extract(text).map(|value| (e.kind(), value)))
    }
}

impl fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.extractors.iter().map(|e| e.kind()))
            .finish()
    }
}
