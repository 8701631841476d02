//! Domain extractors: grades, attendance, narrative details and
//! full-text section scans.

mod attendance;
mod details;
mod grades;
mod sections;

pub use attendance::{AttendanceExtractor, DedupPolicy};
pub use details::DetailExtractor;
pub use grades::GradeExtractor;
pub use sections::{SectionRecords, SectionScanner};
