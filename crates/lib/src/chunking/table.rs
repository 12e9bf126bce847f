//! Unclosed-table detection.
//!
//! This is a marker heuristic, not an HTML parser: it only compares the last
//! `<table` and the last `</table` occurrence in a section. Nested tables or
//! markers inside cell text are not understood.

use crate::constants::{TABLE_CLOSE_MARKER, TABLE_OPEN_MARKER};

/// Offset (in chars) of the last `<table` marker when no `</table` follows it.
pub fn unclosed_table_offset(section: &[char]) -> Option<usize> {
    let open = rfind_marker(section, TABLE_OPEN_MARKER)?;
    match rfind_marker(section, TABLE_CLOSE_MARKER) {
        Some(close) if close > open => None,
        _ => Some(open),
    }
}

/// Last position of `marker` in `haystack`, ASCII case-insensitive.
fn rfind_marker(haystack: &[char], marker: &str) -> Option<usize> {
    let needle: Vec<char> = marker.chars().collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| {
        haystack[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}
