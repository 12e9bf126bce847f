//! # Section Chunking Tests
//!
//! Exercises the sliding-window splitter: boundary selection, overlap,
//! page attribution, the unclosed-table continuation and input validation.

use anyhow::Result;
use policyrag::chunking::{find_page, pages_from_texts, table::unclosed_table_offset};
use policyrag::{split_text, Chunk, ChunkError, ChunkerConfig, ExtractorSet, PageBlock};

const WORDS: [&str; 11] = [
    "poliza",
    "cobertura",
    "asegurado",
    "vehiculo",
    "siniestro",
    "franquicia",
    "prima",
    "endoso",
    "riesgo",
    "beneficiario",
    "vigencia",
];

fn chunk_all(pages: &[PageBlock], config: &ChunkerConfig) -> Result<Vec<Chunk>> {
    let extractors = ExtractorSet::empty();
    Ok(split_text(pages, config, &extractors)?.collect())
}

fn spans(chunks: &[Chunk]) -> Vec<(usize, usize)> {
    chunks.iter().map(|c| (c.start_offset, c.end_offset)).collect()
}

/// A long deterministic document: sentences every 13 words, commas every 5.
fn generated_text(words: usize, with_separators: bool) -> String {
    (0..words)
        .map(|i| {
            let word = WORDS[(i * 7) % WORDS.len()];
            let sep = if !with_separators {
                ""
            } else if i % 13 == 12 {
                ". "
            } else if i % 5 == 4 {
                ", "
            } else {
                " "
            };
            format!("{word}{sep}")
        })
        .collect()
}

/// Cuts `text` into `count` pages of roughly equal length.
fn paginate(text: &str, count: usize) -> Vec<PageBlock> {
    let chars: Vec<char> = text.chars().collect();
    let size = chars.len() / count;
    let texts: Vec<String> = (0..count)
        .map(|i| {
            let end = if i + 1 == count { chars.len() } else { (i + 1) * size };
            chars[i * size..end].iter().collect()
        })
        .collect();
    pages_from_texts(texts)
}

#[test]
fn test_first_section_breaks_after_word_in_search_window() -> Result<()> {
    let text = "Hello world. This is a test of chunking logic here.";
    let pages = pages_from_texts([text]);
    let config = ChunkerConfig::with_lengths(20, 5, 5);

    let chunks = chunk_all(&pages, &config)?;

    // No sentence ending in [20, 25): the cut falls back to the space at 22
    // and keeps it.
    assert_eq!(chunks[0].text, "Hello world. This is a ");
    assert_eq!(chunks[0].end_offset, 23);
    // The next cursor is 23 - 5 = 18, snapped back to just after "world.".
    assert_eq!(chunks[1].start_offset, 12);
    assert!(chunks[1].start_offset <= chunks[0].end_offset);
    assert_eq!(
        spans(&chunks),
        vec![(0, 23), (12, 40), (23, 51)],
        "Unexpected section boundaries"
    );
    assert_eq!(chunks[2].text, "test of chunking logic here.");
    Ok(())
}

#[test]
fn test_short_document_yields_no_sections() -> Result<()> {
    let pages = pages_from_texts(["Hola"]);
    let chunks = chunk_all(&pages, &ChunkerConfig::default())?;
    assert!(chunks.is_empty());
    Ok(())
}

#[test]
fn test_degenerate_documents_yield_no_sections() -> Result<()> {
    let config = ChunkerConfig::with_lengths(20, 5, 5);
    assert!(chunk_all(&[], &config)?.is_empty());
    assert!(chunk_all(&pages_from_texts([""]), &config)?.is_empty());
    assert!(chunk_all(&pages_from_texts(["x"]), &config)?.is_empty());
    // Exactly `section_overlap` characters is still too short.
    assert!(chunk_all(&pages_from_texts(["abcde"]), &config)?.is_empty());
    assert_eq!(chunk_all(&pages_from_texts(["abcdef"]), &config)?.len(), 1);
    Ok(())
}

#[test]
fn test_sections_carry_start_page() -> Result<()> {
    let pages = pages_from_texts([
        "First page text. It has two sentences! ",
        "Second page, with more words here? Yes. ",
        "Third and final page of the document. ",
    ]);
    let config = ChunkerConfig::with_lengths(30, 10, 8);

    let chunks = chunk_all(&pages, &config)?;

    assert_eq!(
        spans(&chunks),
        vec![(0, 38), (20, 68), (52, 100), (78, 117)]
    );
    assert_eq!(chunks[0].text, "First page text. It has two sentences!");
    let page_indices: Vec<usize> = chunks.iter().map(|c| c.page_index).collect();
    assert_eq!(page_indices, vec![0, 0, 1, 1]);
    Ok(())
}

#[test]
fn test_text_without_breaks_is_hard_cut() -> Result<()> {
    let text = "a".repeat(100);
    let config = ChunkerConfig::with_lengths(30, 5, 5);

    let chunks = chunk_all(&pages_from_texts([text]), &config)?;

    // The forward scan runs the full search limit and keeps one more char.
    assert_eq!(chunks[0].char_len(), 30 + 5 + 1);
    assert_eq!(
        spans(&chunks),
        vec![(0, 36), (28, 67), (59, 98), (61, 100)]
    );
    Ok(())
}

#[test]
fn test_unclosed_table_restarts_next_section_at_table() -> Result<()> {
    let text = "Alpha beta gamma delta. Epsilon zeta eta theta. \
                <table><tr><td>A one</td></tr><tr><td>B two</td></tr></table> Omega ends here.";
    let table_open = text.find("<table").unwrap();
    assert_eq!(table_open, 48);
    let config = ChunkerConfig::with_lengths(60, 10, 10);

    let chunks = chunk_all(&pages_from_texts([text]), &config)?;

    assert_eq!(spans(&chunks), vec![(0, 65), (47, 116), (47, 126)]);
    let first: Vec<char> = chunks[0].text.chars().collect();
    assert_eq!(unclosed_table_offset(&first), Some(48));
    // The next section re-includes the whole table.
    assert!(chunks[1].start_offset <= table_open);
    assert!(chunks[1].text.contains("<table><tr><td>A one</td>"));
    assert!(chunks[1].text.contains("</table>"));
    Ok(())
}

#[test]
fn test_table_near_section_start_uses_normal_overlap() -> Result<()> {
    let text = format!(
        "{}<table><tr><td>Cell one</td><td>Cell two</td></tr><tr><td>x</td></tr></table> Trailing words after table.",
        "Intro sentence here. ".repeat(3)
    );
    let config = ChunkerConfig::with_lengths(60, 10, 10);

    let chunks = chunk_all(&pages_from_texts([text]), &config)?;

    // The second section ends mid-table, but the table opens only 15 chars
    // in, inside 2 * sentence_search_limit, so the cursor is end - overlap.
    let second: Vec<char> = chunks[1].text.chars().collect();
    assert_eq!(unclosed_table_offset(&second), Some(15));
    assert_eq!(spans(&chunks), vec![(0, 62), (48, 123), (100, 168)]);
    Ok(())
}

#[test]
fn test_unclosed_table_without_breaks_still_terminates() -> Result<()> {
    // No sentence ending or word break anywhere: the second section snaps
    // back to 0, so the table start no longer lies ahead of the cursor.
    let text = "ggbdcfbbbf<table>ddegabgacg";
    let config = ChunkerConfig::with_lengths(26, 2, 3);
    let extractors = ExtractorSet::empty();

    let chunks: Vec<Chunk> = split_text(&pages_from_texts([text]), &config, &extractors)?
        .take(16)
        .collect();

    assert!(chunks.len() < 16, "splitter kept emitting sections");
    assert_eq!(spans(&chunks), vec![(0, 27), (0, 27)]);
    assert_eq!(chunks.last().map(|c| c.end_offset), Some(27));
    Ok(())
}

#[test]
fn test_next_section_starts_inside_open_table() -> Result<()> {
    // Table safety: whenever a section leaves a table open far enough in,
    // the next section starts at or before that table.
    let rows: String = (0..40)
        .map(|i| format!("<tr><td>fila {i}</td><td>monto {i}</td></tr>"))
        .collect();
    let text = format!(
        "{} <table>{rows}</table> {}",
        generated_text(60, true),
        generated_text(60, true)
    );
    let config = ChunkerConfig::with_lengths(300, 30, 40);

    let chunks = chunk_all(&pages_from_texts([text]), &config)?;

    for pair in chunks.windows(2) {
        let chars: Vec<char> = pair[0].text.chars().collect();
        if let Some(open) = unclosed_table_offset(&chars) {
            if open > 2 * config.sentence_search_limit {
                assert!(
                    pair[1].start_offset <= pair[0].start_offset + open,
                    "section {:?} left a table open at {} but the next starts at {}",
                    (pair[0].start_offset, pair[0].end_offset),
                    pair[0].start_offset + open,
                    pair[1].start_offset
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_sections_cover_whole_document() -> Result<()> {
    for with_separators in [true, false] {
        for (max, limit, overlap) in [(200, 40, 30), (1000, 100, 100), (50, 10, 5)] {
            let text = generated_text(900, with_separators);
            let length = text.chars().count();
            let pages = paginate(&text, 4);
            let config = ChunkerConfig::with_lengths(max, limit, overlap);

            let chunks = chunk_all(&pages, &config)?;

            assert_eq!(chunks.first().map(|c| c.start_offset), Some(0));
            assert_eq!(chunks.last().map(|c| c.end_offset), Some(length));
            for pair in chunks.windows(2) {
                assert!(
                    pair[1].start_offset <= pair[0].end_offset,
                    "gap between {:?} and {:?}",
                    (pair[0].start_offset, pair[0].end_offset),
                    (pair[1].start_offset, pair[1].end_offset)
                );
                assert!(pair[1].end_offset > pair[0].end_offset);
            }
            for chunk in &chunks {
                assert!(
                    chunk.char_len() <= max + 2 * limit,
                    "section of {} chars exceeds bound for {:?}",
                    chunk.char_len(),
                    (max, limit, overlap)
                );
                assert_eq!(chunk.text.chars().count(), chunk.char_len());
            }
        }
    }
    Ok(())
}

#[test]
fn test_page_attribution_follows_start_offset() -> Result<()> {
    let text = generated_text(600, true);
    let pages = paginate(&text, 5);
    let config = ChunkerConfig::with_lengths(200, 40, 30);

    let chunks = chunk_all(&pages, &config)?;

    for chunk in &chunks {
        let expected = pages
            .iter()
            .rev()
            .find(|p| p.start_offset <= chunk.start_offset)
            .map(|p| p.page_index);
        assert_eq!(Some(chunk.page_index), expected);
        assert_eq!(find_page(&pages, chunk.start_offset), expected);
    }
    assert!(chunks.iter().any(|c| c.page_index == 4));
    Ok(())
}

#[test]
fn test_find_page_skips_empty_pages() {
    let pages = pages_from_texts(["abc", "", "de"]);
    assert_eq!(find_page(&pages, 0), Some(0));
    assert_eq!(find_page(&pages, 2), Some(0));
    assert_eq!(find_page(&pages, 3), Some(2));
    assert_eq!(find_page(&pages, 99), Some(2));
    assert_eq!(find_page(&[], 0), None);
}

#[test]
fn test_rechunking_is_deterministic() -> Result<()> {
    let pages = paginate(&generated_text(500, true), 3);
    let config = ChunkerConfig::with_lengths(120, 20, 15);
    let extractors = ExtractorSet::insurance()?;

    let first: Vec<Chunk> = split_text(&pages, &config, &extractors)?.collect();
    let second: Vec<Chunk> = split_text(&pages, &config, &extractors)?.collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_offsets_count_characters_not_bytes() -> Result<()> {
    let text = "Póliza número uno. Señor asegurado, ñandú. Fin del texto aquí.";
    let config = ChunkerConfig::with_lengths(20, 5, 4);

    let chunks = chunk_all(&pages_from_texts([text]), &config)?;

    let chars: Vec<char> = text.chars().collect();
    for chunk in &chunks {
        let expected: String = chars[chunk.start_offset..chunk.end_offset].iter().collect();
        assert_eq!(chunk.text, expected);
    }
    assert_eq!(chunks.last().map(|c| c.end_offset), Some(chars.len()));
    Ok(())
}

#[test]
fn test_extractors_tag_each_section() -> Result<()> {
    let text = "Titular Juan Perez D.N.I. 12345678 domicilio en Rosario. \
                La cobertura incluye granizo y robo total del vehiculo asegurado. \
                PÓLIZA N° 123-45678901-00 emitida en Buenos Aires.";
    let config = ChunkerConfig::with_lengths(60, 10, 10);
    let extractors = ExtractorSet::insurance()?;

    let chunks: Vec<Chunk> = split_text(&pages_from_texts([text]), &config, &extractors)?.collect();

    assert_eq!(chunks[0].national_id(), Some("12345678"));
    assert_eq!(chunks[0].policy_number(), None);
    let last = chunks.last().unwrap();
    assert_eq!(last.policy_number(), Some("123-45678901-00"));
    assert_eq!(last.national_id(), None);
    assert!(chunks.iter().all(|c| c.tax_id().is_none()));
    Ok(())
}

#[test]
fn test_non_contiguous_pages_are_rejected() {
    let config = ChunkerConfig::default();
    let extractors = ExtractorSet::empty();

    let gap = vec![PageBlock::new(0, 0, "abc"), PageBlock::new(1, 5, "def")];
    let overlap = vec![PageBlock::new(0, 0, "abc"), PageBlock::new(1, 2, "def")];
    let unordered = vec![PageBlock::new(1, 0, "abc"), PageBlock::new(0, 3, "def")];
    let not_at_zero = vec![PageBlock::new(0, 4, "abc")];

    for pages in [gap, overlap, unordered, not_at_zero] {
        let result = split_text(&pages, &config, &extractors);
        assert!(
            matches!(result, Err(ChunkError::InvalidInput(_))),
            "expected InvalidInput for {pages:?}"
        );
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let pages = pages_from_texts(["some text"]);
    let extractors = ExtractorSet::empty();

    for config in [
        ChunkerConfig::with_lengths(0, 5, 0),
        ChunkerConfig::with_lengths(10, 5, 10),
        ChunkerConfig::with_lengths(10, 5, 20),
    ] {
        assert!(matches!(
            split_text(&pages, &config, &extractors),
            Err(ChunkError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_default_config_matches_production_values() {
    let config = ChunkerConfig::default();
    assert_eq!(config.max_section_length, 1000);
    assert_eq!(config.sentence_search_limit, 100);
    assert_eq!(config.section_overlap, 100);
    assert_eq!(config.sentence_endings, vec!['.', '!', '?']);
    assert!(config.word_breaks.contains(&'\n'));
    assert!(config.word_breaks.contains(&'{'));
    assert_eq!(config.word_breaks.len(), 12);
}
