//! # Layout Conversion
//!
//! Turns the output of a document-layout (OCR) service into the page blocks
//! the chunker consumes. Tables detected on a page are rendered as HTML and
//! spliced into the page text in place of the characters they cover, so
//! downstream indexing keeps their row and column structure.

use crate::chunking::PageBlock;
use crate::errors::ChunkError;
use serde::{Deserialize, Serialize};

/// A character range in the analyzed document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    #[default]
    Content,
    ColumnHeader,
    RowHeader,
    StubHead,
    Description,
}

impl CellKind {
    fn is_header(&self) -> bool {
        matches!(self, CellKind::ColumnHeader | CellKind::RowHeader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default = "one")]
    pub row_span: usize,
    #[serde(default = "one")]
    pub column_span: usize,
    #[serde(default)]
    pub kind: CellKind,
    pub content: String,
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// One-based number of the page the table is drawn on.
    pub page_number: usize,
    pub row_count: usize,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

/// The document-wide layout result: full content plus page and table spans.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    pub content: String,
    #[serde(default)]
    pub pages: Vec<Span>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Renders a table as a flat HTML fragment, one `<tr>` per row.
pub fn table_to_html(table: &Table) -> String {
    let mut html = String::from("<table>");
    for row in 0..table.row_count {
        let mut cells: Vec<&TableCell> = table.cells.iter().filter(|c| c.row_index == row).collect();
        cells.sort_by_key(|c| c.column_index);

        html.push_str("<tr>");
        for cell in cells {
            let tag = if cell.kind.is_header() { "th" } else { "td" };
            let mut spans = String::new();
            if cell.column_span > 1 {
                spans.push_str(&format!(" colSpan={}", cell.column_span));
            }
            if cell.row_span > 1 {
                spans.push_str(&format!(" rowSpan={}", cell.row_span));
            }
            html.push_str(&format!(
                "<{tag}{spans}>{}</{tag}>",
                escape_html(&cell.content)
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds one block per analyzed page, tables replaced by their HTML.
///
/// Every page gets a trailing space so words never fuse across a page break.
pub fn build_page_blocks(doc: &AnalyzedDocument) -> Result<Vec<PageBlock>, ChunkError> {
    let content: Vec<char> = doc.content.chars().collect();
    let mut blocks = Vec::with_capacity(doc.pages.len());
    let mut offset = 0;

    for (page_num, page) in doc.pages.iter().enumerate() {
        if page.offset + page.length > content.len() {
            return Err(ChunkError::InvalidInput(format!(
                "page {} span {}..{} exceeds content length {}",
                page_num,
                page.offset,
                page.offset + page.length,
                content.len()
            )));
        }

        let tables_on_page: Vec<&Table> = doc
            .tables
            .iter()
            .filter(|t| t.page_number == page_num + 1)
            .collect();

        // Which table, if any, covers each character of the page.
        let mut table_chars: Vec<Option<usize>> = vec![None; page.length];
        for (table_id, table) in tables_on_page.iter().enumerate() {
            for span in &table.spans {
                for i in 0..span.length {
                    if let Some(idx) = (span.offset + i).checked_sub(page.offset) {
                        if idx < page.length {
                            table_chars[idx] = Some(table_id);
                        }
                    }
                }
            }
        }

        let mut page_text = String::new();
        let mut added = vec![false; tables_on_page.len()];
        for (idx, slot) in table_chars.iter().enumerate() {
            match slot {
                None => page_text.push(content[page.offset + idx]),
                Some(table_id) if !added[*table_id] => {
                    page_text.push_str(&table_to_html(tables_on_page[*table_id]));
                    added[*table_id] = true;
                }
                Some(_) => {}
            }
        }
        page_text.push(' ');

        let block = PageBlock::new(page_num, offset, page_text);
        offset += block.char_len();
        blocks.push(block);
    }

    Ok(blocks)
}
