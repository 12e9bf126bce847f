use async_trait::async_trait;
use policyrag::ingest::{IndexingResult, IngestError, SearchIndex, Section};
use policyrag::layout::{AnalyzedDocument, CellKind, Span, Table, TableCell};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// --- Mock Search Index ---

/// Records every uploaded batch for assertion.
#[derive(Clone, Debug, Default)]
pub struct MockSearchIndex {
    name: String,
    created: Arc<Mutex<bool>>,
    batches: Arc<Mutex<Vec<Vec<Section>>>>,
    rejected: Arc<Mutex<HashSet<String>>>,
}

impl MockSearchIndex {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Makes the index report the section with this `id` as failed.
    pub fn reject(&self, id: &str) {
        self.rejected.lock().unwrap().insert(id.to_string());
    }

    /// All uploaded sections, in upload order.
    pub fn uploaded(&self) -> Vec<Section> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    /// The size of every uploaded batch.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn was_created(&self) -> bool {
        *self.created.lock().unwrap()
    }
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_index(&self) -> Result<bool, IngestError> {
        let mut created = self.created.lock().unwrap();
        let newly_created = !*created;
        *created = true;
        Ok(newly_created)
    }

    async fn upload_documents(
        &self,
        batch: &[Section],
    ) -> Result<Vec<IndexingResult>, IngestError> {
        self.batches.lock().unwrap().push(batch.to_vec());
        let rejected = self.rejected.lock().unwrap();
        Ok(batch
            .iter()
            .map(|s| IndexingResult {
                key: s.id.clone(),
                succeeded: !rejected.contains(&s.id),
            })
            .collect())
    }
}

// --- Layout Fixtures ---

/// A two-page layout result whose first page holds a 2x2 table with a header row.
pub fn sample_layout() -> AnalyzedDocument {
    let page_one = "Cobertura: ABC DEF ";
    let page_two = "Pagina dos.";
    let content = format!("{page_one}{page_two}");
    let cell = |row_index, column_index, kind, content: &str| TableCell {
        row_index,
        column_index,
        row_span: 1,
        column_span: 1,
        kind,
        content: content.to_string(),
    };

    AnalyzedDocument {
        content,
        pages: vec![
            Span {
                offset: 0,
                length: page_one.chars().count(),
            },
            Span {
                offset: page_one.chars().count(),
                length: page_two.chars().count(),
            },
        ],
        tables: vec![Table {
            page_number: 1,
            row_count: 2,
            spans: vec![Span {
                offset: 11,
                length: 7,
            }],
            cells: vec![
                cell(1, 1, CellKind::Content, "F"),
                cell(0, 0, CellKind::ColumnHeader, "A"),
                cell(0, 1, CellKind::ColumnHeader, "B"),
                cell(1, 0, CellKind::Content, "D&E"),
            ],
        }],
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a PDF with one page per entry of `pages`, compatible with printpdf v0.8.2.
    pub fn generate_test_pdf(pages: &[&str]) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test Policy");
        let layer_def = Layer::new("Layer 1");
        let layer_id = doc.add_layer(&layer_def);

        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        for text in pages {
            let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
            page.ops = vec![
                Op::BeginLayer {
                    layer_id: layer_id.clone(),
                },
                Op::SetFontSize {
                    size: Pt(12.0),
                    font: font_id.clone(),
                },
                Op::StartTextSection,
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font_id.clone(),
                },
                Op::EndTextSection,
                Op::EndLayer {
                    layer_id: layer_id.clone(),
                },
            ];
            doc.pages.push(page);
        }

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            eprintln!("PDF generation warnings: {warnings:?}");
        }

        Ok(bytes)
    }
}
