//! # saenggibu
//!
//! Heuristic extraction of structured student records from Korean school
//! transcript documents.
//!
//! The library takes page-level text and tables from any
//! [`DocumentSource`], classifies each page into a record domain, and
//! runs domain extractors that turn noisy transcript layouts into typed
//! records: subject grades, attendance tallies, narrative subject
//! commentary, school history, creative activity hours and behavioral
//! opinions. Extraction never fails; malformed input degrades to partial
//! or empty output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use saenggibu::extract_json_file;
//!
//! fn main() -> saenggibu::Result<()> {
//!     // Extract from a serialized page dump
//!     let report = extract_json_file("transcript.json")?;
//!
//!     println!("student: {}", report.student_info.name_or_unknown());
//!     println!("subjects: {}", report.academic_records.len());
//!     println!("attendance years: {}", report.attendance_records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Page classification**: keyword scoring routes pages to domain extractors
//! - **Table validation**: keyword and numeric-density gates before extraction
//! - **Context inheritance**: grade/semester markers carry across pages with decay
//! - **Identity parsing**: names, birth dates, gender, school from front pages
//! - **Section scans**: school history, creative activities, behavioral opinions
//! - **Parallel batch runs**: Uses Rayon for multi-document workloads

pub mod classify;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod text;

// Re-export commonly used types
pub use classify::{PageClassifier, TableValidator};
pub use error::{Error, Result};
pub use extract::{
    AttendanceExtractor, DedupPolicy, DetailExtractor, GradeExtractor, SectionRecords,
    SectionScanner,
};
pub use model::{
    AttendanceRecord, BehavioralRecord, CauseTally, ContextOrigin, CreativeActivityRecord,
    DetailRecord, ExtractionMethod, ExtractionReport, ExtractionStats, GradeRecord, MarkerKind,
    PageDomain, Provenance, RawPage, RawTable, SchoolHistoryRecord, StudentInfo,
};
pub use pipeline::{ExtractOptions, Pipeline};
pub use source::{load_pages, DocumentSource, MemorySource};
pub use text::{ContextTracker, ScoreParser, StudentInfoExtractor};

use std::path::Path;

/// Extract a report from pages already in memory.
///
/// # Example
///
/// ```
/// use saenggibu::{extract_pages, RawPage};
///
/// let pages = vec![RawPage::new(
///     1,
///     "출결상황\n1학년 수업일수 190 출석일수 189 지각 1 조퇴 0 결석 1",
/// )];
/// let report = extract_pages(pages);
/// assert_eq!(report.attendance_records.len(), 1);
/// ```
pub fn extract_pages(pages: Vec<RawPage>) -> ExtractionReport {
    Pipeline::new().extract(&MemorySource::from_pages(pages))
}

/// Extract a report from a serialized page dump.
///
/// The dump format is `{"pages": [{"number", "text", "tables"}]}`; see
/// [`MemorySource::from_json_str`].
pub fn extract_json_str(json: &str) -> Result<ExtractionReport> {
    let source = MemorySource::from_json_str(json)?;
    Ok(Pipeline::new().extract(&source))
}

/// Extract a report from a page-dump file.
///
/// # Example
///
/// ```no_run
/// use saenggibu::extract_json_file;
///
/// let report = extract_json_file("transcript.json").unwrap();
/// println!("{} records", report.total_records());
/// ```
pub fn extract_json_file<P: AsRef<Path>>(path: P) -> Result<ExtractionReport> {
    let source = MemorySource::from_json_file(path)?;
    Ok(Pipeline::new().extract(&source))
}
