//! Typed records produced by the extraction pipeline.

use super::Provenance;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One subject's scores for one grade/semester.
///
/// Numeric sub-fields stay independently optional: transcripts routinely
/// omit some of them, and a missing value must not invent a zero. Score
/// strings keep their source float rendering ("82" is stored as "82.0").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// School grade, 1..=3
    pub grade: u8,

    /// Semester, 1..=2
    pub semester: u8,

    /// Curriculum area (교과), e.g. 국어, 수학
    pub curriculum: String,

    /// Course title (과목), e.g. 문학, 미적분
    pub subject: String,

    /// Course type (일반선택/진로선택) when stated in the row
    pub subject_type: Option<String>,

    /// Raw subject cell before whitespace cleanup, when cleanup changed it
    pub original_subject_name: Option<String>,

    /// Raw score (원점수)
    pub raw_score: Option<String>,

    /// Cohort average (과목평균)
    pub subject_average: Option<String>,

    /// Cohort standard deviation (표준편차)
    pub standard_deviation: Option<String>,

    /// Achievement level letter (성취도), A..=E
    pub achievement_level: Option<String>,

    /// Number of students in the cohort (수강자수)
    pub student_count: Option<u32>,

    /// Rank band (석차등급)
    pub grade_rank: Option<String>,

    /// Credit hours (단위수)
    pub credit_hours: Option<u32>,

    /// Where the record came from
    pub provenance: Provenance,
}

impl GradeRecord {
    /// Create a record with identity fields set and all scores empty.
    pub fn new(grade: u8, semester: u8, provenance: Provenance) -> Self {
        Self {
            grade,
            semester,
            curriculum: String::new(),
            subject: String::new(),
            subject_type: None,
            original_subject_name: None,
            raw_score: None,
            subject_average: None,
            standard_deviation: None,
            achievement_level: None,
            student_count: None,
            grade_rank: None,
            credit_hours: None,
            provenance,
        }
    }

    /// Check whether any score-bearing field is populated.
    pub fn has_scores(&self) -> bool {
        self.raw_score.is_some()
            || self.subject_average.is_some()
            || self.standard_deviation.is_some()
            || self.achievement_level.is_some()
            || self.grade_rank.is_some()
    }
}

/// Absence-style counts broken down by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseTally {
    /// Due to illness (질병)
    pub disease: u32,

    /// Unexcused (미인정)
    pub unexcused: u32,

    /// Other causes (기타)
    pub other: u32,
}

impl CauseTally {
    /// Sum of all three causes.
    pub fn total(&self) -> u32 {
        self.disease + self.unexcused + self.other
    }

    /// Component-wise maximum of two tallies.
    pub fn max(&self, other: &CauseTally) -> CauseTally {
        CauseTally {
            disease: self.disease.max(other.disease),
            unexcused: self.unexcused.max(other.unexcused),
            other: self.other.max(other.other),
        }
    }
}

/// Attendance tallies for one school grade.
///
/// Attendance is documented annually, so `semester` is `None` unless the
/// source text explicitly names one; consumers that need a semester key
/// apply their own default at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// School grade, 1..=3
    pub grade: u8,

    /// Semester when the source names one, otherwise annual
    pub semester: Option<u8>,

    /// Absence counts (결석)
    pub absence: CauseTally,

    /// Tardiness counts (지각)
    pub tardiness: CauseTally,

    /// Early-leave counts (조퇴)
    pub early_leave: CauseTally,

    /// Free-text remarks (특기사항)
    pub special_notes: String,

    /// Total school days (수업일수) when stated
    pub school_days: Option<u32>,

    /// Days attended (출석일수) when stated
    pub attendance_days: Option<u32>,

    /// Where the record came from
    pub provenance: Provenance,
}

impl AttendanceRecord {
    /// Create an annual record with zeroed counters.
    pub fn annual(grade: u8, provenance: Provenance) -> Self {
        Self {
            grade,
            semester: None,
            absence: CauseTally::default(),
            tardiness: CauseTally::default(),
            early_leave: CauseTally::default(),
            special_notes: String::new(),
            school_days: None,
            attendance_days: None,
            provenance,
        }
    }

    /// Sum of all nine cause counters.
    pub fn counter_total(&self) -> u32 {
        self.absence.total() + self.tardiness.total() + self.early_leave.total()
    }

    /// Key used for deduplication across extraction paths.
    pub fn dedup_key(&self) -> (u8, Option<u8>) {
        (self.grade, self.semester)
    }
}

/// A narrative subject commentary entry (세부능력 및 특기사항).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Course title the commentary is about
    pub subject: String,

    /// Commentary text, at least 20 characters after validation
    pub content: String,

    /// School grade, 1..=3
    pub grade: u8,

    /// Semester, 1..=2
    pub semester: u8,

    /// Where the record came from (includes the extraction method)
    pub provenance: Provenance,
}

impl DetailRecord {
    /// Create a detail record.
    pub fn new(
        subject: impl Into<String>,
        content: impl Into<String>,
        grade: u8,
        semester: u8,
        provenance: Provenance,
    ) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
            grade,
            semester,
            provenance,
        }
    }

    /// Content length in characters (the content is Korean; bytes would
    /// triple-count it).
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// A dated school enrollment event (학적사항), e.g. 입학 or 졸업.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolHistoryRecord {
    /// Event date
    pub date: NaiveDate,

    /// School name, e.g. 한빛고등학교
    pub school_name: String,

    /// School grade at the event as written; prior schools may go past 3
    pub grade: u8,

    /// Event kind as written (입학/졸업)
    pub event: String,

    /// Where the record came from
    pub provenance: Provenance,
}

/// Creative experiential activity hours (창의적체험활동) per grade/semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeActivityRecord {
    /// School grade, 1..=3
    pub grade: u8,

    /// Semester, 1..=2
    pub semester: u8,

    /// Activity area name
    pub activity_type: String,

    /// Recorded hours
    pub hours: u32,

    /// Where the record came from
    pub provenance: Provenance,
}

/// A behavioral characteristics / overall opinion block (행동특성 및 종합의견).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralRecord {
    /// School grade when the block names one
    pub grade: Option<u8>,

    /// Narrative text
    pub content: String,

    /// Where the record came from
    pub provenance: Provenance,
}
