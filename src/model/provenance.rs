//! Provenance and context types attached to extracted records.

use serde::{Deserialize, Serialize};

/// How a record was obtained from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Parsed from a validated table with a column map
    Table,
    /// Table flattened to text and re-parsed with text patterns
    TableAsText,
    /// Matched directly in page text
    TextPattern,
}

/// The kind of grade/semester marker that matched in page text.
///
/// Declaration order is the matching priority; each kind carries a fixed
/// confidence since later kinds are looser fallbacks, not equals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// `[N학년]`
    Bracket,
    /// `N학년 M학기`
    GradeSemester,
    /// `N-M`
    Dash,
    /// `제N학년`
    Ordinal,
}

impl MarkerKind {
    /// Fixed confidence assigned to a match of this marker.
    pub fn confidence(&self) -> f32 {
        match self {
            MarkerKind::Bracket => 1.0,
            MarkerKind::GradeSemester => 1.0,
            MarkerKind::Dash => 0.8,
            MarkerKind::Ordinal => 0.9,
        }
    }
}

/// Where a page's grade/semester context came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextOrigin {
    /// An explicit marker matched on this page
    Marker {
        /// Which marker pattern matched
        marker: MarkerKind,
        /// Page the marker was found on
        page: u32,
    },
    /// Copied from an earlier page that had context
    Inherited {
        /// Page the context was copied from
        from_page: u32,
    },
    /// No marker on this page and nothing to inherit
    Default,
}

/// Grade/semester context resolved for one page.
///
/// Threaded page-to-page within a single extractor run: an explicit marker
/// overrides anything inherited, a missing marker copies the prior page's
/// context at reduced confidence, and with no prior context the defaults
/// below apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionContext {
    /// School grade (1..=3) when known
    pub grade: Option<u8>,

    /// Semester (1..=2) when known
    pub semester: Option<u8>,

    /// Trust in this context, 0.0..=1.0
    pub confidence: f32,

    /// Where the context came from
    pub origin: ContextOrigin,
}

impl ExtractionContext {
    /// Decay factor applied per inherited page hop.
    pub const INHERIT_DECAY: f32 = 0.8;

    /// Fallback context: first grade, first semester, low confidence.
    pub fn fallback() -> Self {
        Self {
            grade: Some(1),
            semester: Some(1),
            confidence: 0.3,
            origin: ContextOrigin::Default,
        }
    }

    /// Context from an explicit marker match.
    pub fn from_marker(marker: MarkerKind, page: u32, grade: u8, semester: Option<u8>) -> Self {
        Self {
            grade: Some(grade),
            semester,
            confidence: marker.confidence(),
            origin: ContextOrigin::Marker { marker, page },
        }
    }

    /// Copy of `prior` with decayed confidence and an inherited origin.
    pub fn inherited_from(prior: &ExtractionContext, from_page: u32) -> Self {
        Self {
            grade: prior.grade,
            semester: prior.semester,
            confidence: prior.confidence * Self::INHERIT_DECAY,
            origin: ContextOrigin::Inherited { from_page },
        }
    }

    /// Grade with the documented fallback of 1.
    pub fn grade_or_default(&self) -> u8 {
        self.grade.unwrap_or(1)
    }

    /// Semester with the documented fallback of 1.
    pub fn semester_or_default(&self) -> u8 {
        self.semester.unwrap_or(1)
    }
}

/// Coordinates and method describing where a record came from.
///
/// Attached to every extracted record for traceability and for dedup
/// tie-breaking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Page number (1-indexed)
    pub page: u32,

    /// Index of the source table on the page, for table-derived records
    pub table_index: Option<usize>,

    /// Row index within the source table
    pub row_index: Option<usize>,

    /// How the record was extracted
    pub method: ExtractionMethod,

    /// Extraction confidence, 0.0..=1.0
    pub confidence: f32,

    /// Context origin for records that used grade/semester context
    pub context: Option<ContextOrigin>,
}

impl Provenance {
    /// Provenance for a record parsed out of a table row.
    pub fn table(page: u32, table_index: usize, row_index: usize) -> Self {
        Self {
            page,
            table_index: Some(table_index),
            row_index: Some(row_index),
            method: ExtractionMethod::Table,
            confidence: 1.0,
            context: None,
        }
    }

    /// Provenance for a record matched in page text.
    pub fn text(page: u32) -> Self {
        Self {
            page,
            table_index: None,
            row_index: None,
            method: ExtractionMethod::TextPattern,
            confidence: 1.0,
            context: None,
        }
    }

    /// Set the extraction method and return self.
    pub fn with_method(mut self, method: ExtractionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the confidence and return self.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Attach a context origin and return self.
    pub fn with_context(mut self, origin: ContextOrigin) -> Self {
        self.context = Some(origin);
        self
    }
}
