//! Text normalization applied before any pattern matching.

use unicode_normalization::UnicodeNormalization;

/// Normalize page text: compose Unicode to NFC and unify line endings.
///
/// PDF text layers frequently deliver Korean as decomposed jamo sequences;
/// every keyword table and regex in this crate assumes composed syllables.
/// Line structure is preserved because page stitching depends on it.
pub fn normalize_page_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.replace("\r\n", "\n").replace('\r', "\n")
}

/// Normalize a table cell: compose Unicode to NFC.
///
/// Trimming and blank-row removal happen later in `RawTable::cleaned`.
pub fn normalize_cell_text(text: &str) -> String {
    text.nfc().collect()
}

/// Collapse every whitespace run (including newlines) to a single space
/// and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
