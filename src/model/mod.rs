//! Data model for transcript extraction.
//!
//! This module defines the raw input shape (pages and tables as a document
//! source delivers them), the typed records the pipeline produces, and the
//! document-level report returned to callers. Records are created once per
//! match and touched again only by deduplication, which drops duplicates
//! or folds their counters into the kept record. Records live only inside
//! the returned report; persistence is entirely the consumer's concern.

mod page;
mod provenance;
mod record;
mod report;
mod student;

pub use page::{PageDomain, RawPage, RawTable};
pub use provenance::{
    ContextOrigin, ExtractionContext, ExtractionMethod, MarkerKind, Provenance,
};
pub use record::{
    AttendanceRecord, BehavioralRecord, CauseTally, CreativeActivityRecord, DetailRecord,
    GradeRecord, SchoolHistoryRecord,
};
pub use report::{ExtractionReport, ExtractionStats};
pub use student::{StudentInfo, UNKNOWN_NAME};
