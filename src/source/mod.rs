//! Document sources: where raw pages come from.

mod memory;

pub use memory::MemorySource;

use crate::model::{RawPage, RawTable};
use crate::text::{normalize_cell_text, normalize_page_text};
use log::debug;

/// Supplier of raw page content for one document.
///
/// The pipeline's only input contract. Implementations must be
/// side-effect-free and idempotent per page: the same index always
/// yields the same content, and a failed extraction yields empty
/// content rather than an error. Indexes are 0-based; anything at or
/// past `page_count` yields empty content.
pub trait DocumentSource {
    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Plain text of one page. Empty on failure or out of range.
    fn page_text(&self, index: usize) -> String;

    /// Raw tables of one page. Empty on failure or out of range.
    fn page_tables(&self, index: usize) -> Vec<RawTable>;
}

/// Read every page of a source into normalized [`RawPage`] values.
///
/// Pages are numbered by position starting at 1. Text is Unicode
/// normalized with line endings unified; table cells are normalized and
/// trimmed, blank rows dropped, and tables reduced to fewer than two
/// rows are discarded.
pub fn load_pages(source: &dyn DocumentSource) -> Vec<RawPage> {
    let count = source.page_count();
    let mut pages = Vec::with_capacity(count);

    for index in 0..count {
        let number = (index + 1) as u32;
        let text = normalize_page_text(&source.page_text(index));

        let mut tables = Vec::new();
        for table in source.page_tables(index) {
            let normalized = RawTable {
                rows: table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|cell| normalize_cell_text(cell)).collect())
                    .collect(),
            };
            if let Some(cleaned) = normalized.cleaned() {
                tables.push(cleaned);
            }
        }

        pages.push(RawPage {
            number,
            text,
            tables,
        });
    }

    debug!("loaded {} pages from source", pages.len());
    pages
}
