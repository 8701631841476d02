//! Raw page input types and page domain classification targets.

use serde::{Deserialize, Serialize};

/// A raw table as delivered by a document source: ordered rows of cell
/// strings, possibly ragged, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    /// Rows of cell text, in reading order
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Create a table from rows of string-like cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (width of the widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row and column, if present.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Get plain text representation: cells joined by spaces, rows by newlines.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Trim every cell and drop rows whose cells are all blank.
    ///
    /// Returns `None` when fewer than two rows survive: such a fragment
    /// cannot carry a header plus data and is rejected up front.
    pub fn cleaned(&self) -> Option<RawTable> {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect())
            .filter(|row: &Vec<String>| row.iter().any(|cell| !cell.is_empty()))
            .collect();
        if rows.len() < 2 {
            return None;
        }
        Some(RawTable { rows })
    }
}

/// A single page of a document: 1-based position, extracted plain text
/// (lossy, may be empty) and zero or more raw tables.
///
/// Produced once per extraction run by the page snapshot and never mutated
/// afterwards; every classifier and extractor reads the same copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Extracted plain text, empty when extraction failed
    #[serde(default)]
    pub text: String,

    /// Tables found on the page, in reading order
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

impl RawPage {
    /// Create a page with text and no tables.
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table and return self.
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Check if the page carries neither text nor tables.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.tables.is_empty()
    }
}

/// Semantic domain of a page, derived from its text content.
///
/// Computed per page and never stored: the same text always classifies the
/// same way, so there is nothing to cache beyond a single extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageDomain {
    /// Student identity section (인적사항)
    StudentInfo,
    /// Academic achievement tables (교과학습발달상황)
    Academic,
    /// Attendance tallies (출결상황)
    Attendance,
    /// Narrative subject commentary (세부능력 및 특기사항)
    Detail,
    /// School enrollment history (학적사항)
    SchoolHistory,
    /// Creative experiential activities (창의적체험활동)
    Creative,
    /// No domain matched
    Unknown,
}

impl PageDomain {
    /// All scored domains, in declaration order.
    ///
    /// Declaration order doubles as the tie-break order when two domains
    /// score equally.
    pub const ALL: [PageDomain; 6] = [
        PageDomain::StudentInfo,
        PageDomain::Academic,
        PageDomain::Attendance,
        PageDomain::Detail,
        PageDomain::SchoolHistory,
        PageDomain::Creative,
    ];

    /// Short lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageDomain::StudentInfo => "student_info",
            PageDomain::Academic => "academic",
            PageDomain::Attendance => "attendance",
            PageDomain::Detail => "detail",
            PageDomain::SchoolHistory => "school_history",
            PageDomain::Creative => "creative",
            PageDomain::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PageDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
