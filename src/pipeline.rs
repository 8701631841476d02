//! Document-level extraction pipeline.
//!
//! [`Pipeline`] wires the page snapshot, the identity pass and the four
//! domain extractors into one run over a [`DocumentSource`]. A run never
//! fails: unreadable pages arrive empty from the source, malformed rows
//! degrade to partial records, and the report simply carries whatever
//! survived. Only opening a serialized page dump can error, which is why
//! [`Pipeline::extract_batch`] returns one `Result` per input file.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::extract::{
    AttendanceExtractor, DedupPolicy, DetailExtractor, GradeExtractor, SectionRecords,
    SectionScanner,
};
use crate::model::{ExtractionReport, ExtractionStats, RawPage};
use crate::source::{load_pages, DocumentSource, MemorySource};
use crate::text::StudentInfoExtractor;

/// How many leading pages the identity pass reads.
const IDENTITY_PAGES: usize = 2;

/// Options controlling a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Hard cap on how many pages are scanned. `None` scans the whole
    /// document.
    pub max_pages: Option<usize>,

    /// How attendance records with the same grade and semester are
    /// reconciled.
    pub attendance_dedup: DedupPolicy,

    /// Skip the full-text section scans (school history, creative
    /// activities, behavioral opinions).
    pub skip_sections: bool,
}

impl ExtractOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the run to the first `limit` pages.
    pub fn with_max_pages(mut self, limit: usize) -> Self {
        self.max_pages = Some(limit);
        self
    }

    /// Set the attendance deduplication policy.
    pub fn with_attendance_dedup(mut self, policy: DedupPolicy) -> Self {
        self.attendance_dedup = policy;
        self
    }

    /// Disable the full-text section scans.
    pub fn with_skip_sections(mut self, skip: bool) -> Self {
        self.skip_sections = skip;
        self
    }
}

/// The full extraction pipeline.
///
/// Construction compiles every pattern once; [`Pipeline::extract`] takes
/// `&self` and keeps all run state local, so one pipeline can serve
/// concurrent documents.
pub struct Pipeline {
    options: ExtractOptions,
    student: StudentInfoExtractor,
    grades: GradeExtractor,
    attendance: AttendanceExtractor,
    details: DetailExtractor,
    sections: SectionScanner,
}

impl Pipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::with_options(ExtractOptions::default())
    }

    /// Create a pipeline with the given options.
    pub fn with_options(options: ExtractOptions) -> Self {
        let attendance = AttendanceExtractor::new().with_dedup_policy(options.attendance_dedup);
        Self {
            options,
            student: StudentInfoExtractor::new(),
            grades: GradeExtractor::new(),
            attendance,
            details: DetailExtractor::new(),
            sections: SectionScanner::new(),
        }
    }

    /// Run the pipeline over one document.
    pub fn extract(&self, source: &dyn DocumentSource) -> ExtractionReport {
        let started = Instant::now();

        let mut pages = load_pages(source);
        if let Some(limit) = self.options.max_pages {
            pages.truncate(limit);
        }
        for page in &pages {
            if page.is_blank() {
                warn!("page {} yielded no content", page.number);
            }
        }

        let mut stats = ExtractionStats::new();
        stats.pages_scanned = pages.len();

        let student_info = self.student.extract(&front_text(&pages));

        let academic_records = self.grades.extract(&pages, &mut stats);
        let attendance_records = self.attendance.extract(&pages, &mut stats);
        let detail_records = self.details.extract(&pages, &mut stats);

        stats.grade_records = academic_records.len();
        stats.attendance_records = attendance_records.len();
        stats.detail_records = detail_records.len();

        let section_records = if self.options.skip_sections {
            SectionRecords::default()
        } else {
            self.sections.scan(&pages)
        };

        let report = ExtractionReport {
            student_info,
            academic_records,
            attendance_records,
            detail_records,
            school_history: section_records.school_history,
            creative_activities: section_records.creative_activities,
            behavioral_records: section_records.behavioral_records,
            stats,
            processing_time: started.elapsed().as_secs_f64(),
            extracted_at: Utc::now(),
        };

        info!(
            "extracted {} records from {} pages in {:.3}s",
            report.total_records(),
            report.stats.pages_scanned,
            report.processing_time
        );
        report
    }

    /// Run the pipeline over many serialized page dumps in parallel.
    ///
    /// Each file is loaded and extracted independently; one unreadable
    /// dump does not stop the others.
    pub fn extract_batch<P>(&self, sources: &[P]) -> Vec<Result<ExtractionReport>>
    where
        P: AsRef<Path> + Sync,
    {
        sources
            .par_iter()
            .map(|path| {
                let source = MemorySource::from_json_file(path)?;
                Ok(self.extract(&source))
            })
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of the leading pages, joined for the identity pass.
fn front_text(pages: &[RawPage]) -> String {
    pages
        .iter()
        .take(IDENTITY_PAGES)
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
