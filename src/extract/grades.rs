//! Academic grade extraction from validated tables.

use crate::classify::{find_header_row, PageClassifier, TableValidator, GRADE_TABLE_KEYWORDS};
use crate::model::{
    ExtractionContext, ExtractionStats, GradeRecord, PageDomain, Provenance, RawPage, RawTable,
};
use crate::text::{collapse_whitespace, ContextCache, ContextTracker, ScoreParser};
use log::{debug, info};

/// Subject-type cell values recognized in grade rows.
const SUBJECT_TYPES: &[&str] = &["일반선택", "진로선택"];

/// Aggregate/footer rows that carry no per-subject data.
const SKIP_ROW_KEYWORDS: &[&str] = &["합계", "총계", "소계", "이수단위"];

/// Table fields recognized by header keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GradeField {
    Semester,
    Curriculum,
    Subject,
    CreditHours,
    RawScore,
    SubjectAverage,
    AchievementLevel,
    StudentCount,
    GradeRank,
}

/// Header keyword table, tried per field in declaration order. The first
/// column containing a keyword claims the field; later columns do not
/// override.
const HEADER_RULES: &[(GradeField, &[&str])] = &[
    (GradeField::Semester, &["학기"]),
    (GradeField::Curriculum, &["교과", "영역"]),
    (GradeField::Subject, &["과목", "과목명"]),
    (GradeField::CreditHours, &["단위수", "단위", "학점"]),
    (GradeField::RawScore, &["원점수", "점수"]),
    (GradeField::SubjectAverage, &["과목평균", "평균"]),
    (GradeField::AchievementLevel, &["성취도", "등급"]),
    (GradeField::StudentCount, &["수강자수", "수강자"]),
    (GradeField::GradeRank, &["석차등급", "석차"]),
];

/// Extracts per-subject grade records from academic pages.
///
/// Pages that classify as academic are scanned for tables passing the
/// grade-table thresholds; each surviving table row becomes at most one
/// record. Row-level problems degrade to dropped rows, never failures.
pub struct GradeExtractor {
    classifier: PageClassifier,
    validator: TableValidator,
    tracker: ContextTracker,
    scores: ScoreParser,
}

impl GradeExtractor {
    /// Create an extractor with default components.
    pub fn new() -> Self {
        Self {
            classifier: PageClassifier::new(),
            validator: TableValidator::new(),
            tracker: ContextTracker::new(),
            scores: ScoreParser::new(),
        }
    }

    /// Extract all grade records from a document's pages.
    ///
    /// Pages must be in document order: grade/semester context resolved
    /// on one academic page is inherited by the next when it carries no
    /// marker of its own.
    pub fn extract(&self, pages: &[RawPage], stats: &mut ExtractionStats) -> Vec<GradeRecord> {
        let mut cache = ContextCache::new();
        let mut records = Vec::new();

        for page in pages {
            if self.classifier.classify(&page.text) != PageDomain::Academic {
                continue;
            }
            stats.count_page(PageDomain::Academic);
            let ctx = cache.resolve(&self.tracker, &page.text, page.number);

            for (table_index, table) in page.tables.iter().enumerate() {
                let accepted = self.validator.is_domain_table(table, PageDomain::Academic);
                stats.count_table(accepted);
                if !accepted {
                    continue;
                }
                let table_records = self.extract_from_table(table, &ctx, page.number, table_index);
                debug!(
                    "page {} table {}: {} grade records",
                    page.number,
                    table_index,
                    table_records.len()
                );
                records.extend(table_records);
            }
        }

        info!("extracted {} grade records", records.len());
        records
    }

    fn extract_from_table(
        &self,
        table: &RawTable,
        ctx: &ExtractionContext,
        page: u32,
        table_index: usize,
    ) -> Vec<GradeRecord> {
        let mut records = Vec::new();
        if table.row_count() < 2 {
            return records;
        }

        let header_index = find_header_row(table, GRADE_TABLE_KEYWORDS).unwrap_or(0);
        let columns = map_headers(&table.rows[header_index]);

        // semester refined row-by-row: an explicit semester cell becomes
        // the baseline for the rows after it
        let mut current_semester = ctx.semester;

        for (offset, row) in table.rows[header_index + 1..].iter().enumerate() {
            if should_skip_row(row) {
                continue;
            }
            let row_index = header_index + 1 + offset;
            if let Some(record) = self.parse_row(
                row,
                &columns,
                ctx,
                current_semester,
                page,
                table_index,
                row_index,
            ) {
                current_semester = Some(record.semester);
                records.push(record);
            }
        }

        records
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_row(
        &self,
        row: &[String],
        columns: &[(GradeField, usize)],
        ctx: &ExtractionContext,
        current_semester: Option<u8>,
        page: u32,
        table_index: usize,
        row_index: usize,
    ) -> Option<GradeRecord> {
        let provenance = Provenance::table(page, table_index, row_index)
            .with_confidence(ctx.confidence)
            .with_context(ctx.origin);

        let mut record = GradeRecord::new(ctx.grade_or_default(), 1, provenance);
        let mut row_semester = current_semester.or(ctx.semester);
        let mut score_parsed = false;

        for &(field, col) in columns {
            let Some(cell) = row.get(col).map(|c| c.trim()).filter(|c| !c.is_empty()) else {
                continue;
            };

            match field {
                GradeField::Semester => {
                    if let Ok(sem) = cell.parse::<u8>() {
                        if (1..=2).contains(&sem) {
                            row_semester = Some(sem);
                        }
                    }
                }
                GradeField::Curriculum => {
                    record.curriculum = self.scores.clean_curriculum_text(cell);
                }
                GradeField::Subject => {
                    let cleaned = collapse_whitespace(cell);
                    if cleaned != cell {
                        record.original_subject_name = Some(cell.to_string());
                    }
                    record.subject = cleaned;
                }
                GradeField::RawScore | GradeField::SubjectAverage => {
                    if score_parsed {
                        continue;
                    }
                    match self.scores.parse_complex_score(cell) {
                        Some(parsed) => {
                            record.raw_score = Some(parsed.raw_score);
                            record.subject_average = parsed.subject_average;
                            record.standard_deviation = parsed.standard_deviation;
                            score_parsed = true;
                        }
                        // unparseable cell is kept verbatim in its field
                        None => match field {
                            GradeField::RawScore => record.raw_score = Some(cell.to_string()),
                            _ => record.subject_average = Some(cell.to_string()),
                        },
                    }
                }
                GradeField::AchievementLevel => {
                    if let Some(parsed) = self.scores.parse_achievement(cell) {
                        record.achievement_level = Some(parsed.level);
                        if parsed.student_count.is_some() {
                            record.student_count = parsed.student_count;
                        }
                    }
                }
                GradeField::StudentCount => {
                    record.student_count = parse_leading_number(cell);
                }
                GradeField::CreditHours => {
                    record.credit_hours = parse_leading_number(cell);
                }
                GradeField::GradeRank => {
                    record.grade_rank = Some(cell.to_string());
                }
            }
        }

        if record.subject.is_empty() {
            return None;
        }

        record.semester = row_semester.unwrap_or(1);
        record.subject_type = row
            .iter()
            .map(|c| c.trim())
            .find(|c| SUBJECT_TYPES.contains(c))
            .map(str::to_string);

        Some(record)
    }
}

impl Default for GradeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Map header cells to fields, first matching column per field.
fn map_headers(headers: &[String]) -> Vec<(GradeField, usize)> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut columns = Vec::new();

    for &(field, keywords) in HEADER_RULES {
        let col = lowered
            .iter()
            .position(|h| keywords.iter().any(|k| h.contains(k)));
        if let Some(col) = col {
            columns.push((field, col));
        }
    }

    columns
}

fn should_skip_row(row: &[String]) -> bool {
    if row.iter().all(|cell| cell.trim().is_empty()) {
        return true;
    }
    let text = row.join(" ").to_lowercase();
    SKIP_ROW_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Whole-cell integer, falling back to the first digit run ("4단위" -> 4).
fn parse_leading_number(cell: &str) -> Option<u32> {
    if let Ok(value) = cell.parse::<u32>() {
        return Some(value);
    }
    let digits: String = cell
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
