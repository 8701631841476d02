//! In-memory document source backed by a page dump.

use crate::error::Result;
use crate::model::{RawPage, RawTable};
use crate::source::DocumentSource;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Wire shape of a page dump file.
#[derive(Deserialize)]
struct PageDump {
    pages: Vec<RawPage>,
}

/// A document held entirely in memory.
///
/// The reference source implementation, used for page dumps produced by
/// upstream text extraction and for building documents in tests. Page
/// order in the dump is the processing order; the pipeline numbers pages
/// by position.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<RawPage>,
}

impl MemorySource {
    /// Create a source from pages in processing order.
    pub fn from_pages(pages: Vec<RawPage>) -> Self {
        Self { pages }
    }

    /// Parse a JSON page dump: `{"pages": [{"number", "text", "tables"}]}`.
    ///
    /// `tables` is an array of tables, each an array of rows of cell
    /// strings. `text` and `tables` may be omitted per page.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dump: PageDump = serde_json::from_str(json)?;
        Ok(Self { pages: dump.pages })
    }

    /// Parse a JSON page dump from a reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let dump: PageDump = serde_json::from_reader(reader)?;
        Ok(Self { pages: dump.pages })
    }

    /// Load a JSON page dump from a file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Check if the source has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> String {
        self.pages
            .get(index)
            .map(|p| p.text.clone())
            .unwrap_or_default()
    }

    fn page_tables(&self, index: usize) -> Vec<RawTable> {
        self.pages
            .get(index)
            .map(|p| p.tables.clone())
            .unwrap_or_default()
    }
}
