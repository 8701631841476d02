//! Document-level extraction result and run statistics.

use super::{
    AttendanceRecord, BehavioralRecord, CreativeActivityRecord, DetailRecord, GradeRecord,
    PageDomain, SchoolHistoryRecord, StudentInfo,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters describing what one extraction run looked at and produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages delivered by the source
    pub pages_scanned: usize,

    /// Pages classified as academic
    pub academic_pages: usize,

    /// Pages classified as attendance
    pub attendance_pages: usize,

    /// Pages classified as detail
    pub detail_pages: usize,

    /// Tables examined by a validator
    pub tables_seen: usize,

    /// Tables that passed domain validation
    pub tables_accepted: usize,

    /// Grade records in the final output
    pub grade_records: usize,

    /// Attendance records in the final output
    pub attendance_records: usize,

    /// Detail records in the final output
    pub detail_records: usize,

    /// Records dropped by deduplication passes
    pub duplicates_dropped: usize,
}

impl ExtractionStats {
    /// Create zeroed stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a page claimed by a domain extractor.
    ///
    /// `pages_scanned` is set once by the pipeline from the source page
    /// count; extractors only bump their own domain counter here.
    pub fn count_page(&mut self, domain: PageDomain) {
        match domain {
            PageDomain::Academic => self.academic_pages += 1,
            PageDomain::Attendance => self.attendance_pages += 1,
            PageDomain::Detail => self.detail_pages += 1,
            _ => {}
        }
    }

    /// Count a table examined by a validator.
    pub fn count_table(&mut self, accepted: bool) {
        self.tables_seen += 1;
        if accepted {
            self.tables_accepted += 1;
        }
    }

    /// Total records across the three core domains.
    pub fn total_records(&self) -> usize {
        self.grade_records + self.attendance_records + self.detail_records
    }

    /// Merge another run's counters into this one (batch aggregation).
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.pages_scanned += other.pages_scanned;
        self.academic_pages += other.academic_pages;
        self.attendance_pages += other.attendance_pages;
        self.detail_pages += other.detail_pages;
        self.tables_seen += other.tables_seen;
        self.tables_accepted += other.tables_accepted;
        self.grade_records += other.grade_records;
        self.attendance_records += other.attendance_records;
        self.detail_records += other.detail_records;
        self.duplicates_dropped += other.duplicates_dropped;
    }
}

/// Everything one extraction run produced for one document.
///
/// List fields keep insertion order; order carries no meaning beyond
/// grouping and callers must not rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Identity fields from the first pages
    pub student_info: StudentInfo,

    /// Per-subject grade records
    pub academic_records: Vec<GradeRecord>,

    /// Per-grade attendance records
    pub attendance_records: Vec<AttendanceRecord>,

    /// Narrative subject commentary records
    pub detail_records: Vec<DetailRecord>,

    /// School enrollment events
    pub school_history: Vec<SchoolHistoryRecord>,

    /// Creative activity hours
    pub creative_activities: Vec<CreativeActivityRecord>,

    /// Behavioral opinion blocks
    pub behavioral_records: Vec<BehavioralRecord>,

    /// Run counters
    pub stats: ExtractionStats,

    /// Wall-clock extraction time in seconds
    pub processing_time: f64,

    /// When the extraction finished
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionReport {
    /// Create an empty report stamped with the current time.
    pub fn new() -> Self {
        Self {
            student_info: StudentInfo::new(),
            academic_records: Vec::new(),
            attendance_records: Vec::new(),
            detail_records: Vec::new(),
            school_history: Vec::new(),
            creative_activities: Vec::new(),
            behavioral_records: Vec::new(),
            stats: ExtractionStats::new(),
            processing_time: 0.0,
            extracted_at: Utc::now(),
        }
    }

    /// Total records across every list.
    pub fn total_records(&self) -> usize {
        self.academic_records.len()
            + self.attendance_records.len()
            + self.detail_records.len()
            + self.school_history.len()
            + self.creative_activities.len()
            + self.behavioral_records.len()
    }

    /// Check whether the run produced nothing at all.
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0 && self.student_info.is_empty()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ExtractionReport {
    fn default() -> Self {
        Self::new()
    }
}
