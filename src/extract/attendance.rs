//! Attendance extraction from tables and page text.

use crate::classify::{find_header_row, PageClassifier, TableValidator, ATTENDANCE_TABLE_KEYWORDS};
use crate::model::{
    AttendanceRecord, ExtractionStats, PageDomain, Provenance, RawPage, RawTable,
};
use crate::text::{grade_in_range, semester_in_range};
use log::{debug, info, warn};
use regex::Regex;

/// Table rows are the primary path and get a fixed reduced confidence,
/// since positional column mapping can mis-slot merged cells.
const TABLE_CONFIDENCE: f32 = 0.8;

/// How [`AttendanceExtractor`] resolves two records with the same
/// grade/semester key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Keep the first record extracted, drop later ones. Table records
    /// come before text records for the same page, so this prefers tables.
    #[default]
    FirstWins,
    /// Fold later records into the first: counter-wise maximum of the
    /// tallies, missing day totals filled in, distinct notes concatenated.
    Merge,
}

/// Extracts yearly attendance summaries (출결상황).
///
/// Tables on attendance pages are the primary source; free-text patterns
/// run afterwards as a fallback for rows the table extractor missed.
/// Duplicate grade/semester keys are resolved document-wide by the
/// configured [`DedupPolicy`].
pub struct AttendanceExtractor {
    classifier: PageClassifier,
    validator: TableValidator,
    detailed: Regex,
    simple: Regex,
    grade_marker: Regex,
    dedup: DedupPolicy,
}

impl AttendanceExtractor {
    /// Create an extractor with the default first-wins dedup policy.
    pub fn new() -> Self {
        Self {
            classifier: PageClassifier::new(),
            validator: TableValidator::new(),
            detailed: Regex::new(
                r"(\d+)학년\s*(?:(\d+)학기)?\s*수업일수\s*(\d+)\s*출석일수\s*(\d+)\s*지각\s*(\d+)\s*조퇴\s*(\d+)\s*결석\s*(\d+)",
            )
            .unwrap(),
            simple: Regex::new(r"(\d+)학년.*?출석\s*(\d+).*?지각\s*(\d+).*?조퇴\s*(\d+).*?결석\s*(\d+)")
                .unwrap(),
            grade_marker: Regex::new(r"(\d)학년").unwrap(),
            dedup: DedupPolicy::default(),
        }
    }

    /// Set the dedup policy and return self.
    pub fn with_dedup_policy(mut self, policy: DedupPolicy) -> Self {
        self.dedup = policy;
        self
    }

    /// Extract attendance records from a document's pages.
    pub fn extract(&self, pages: &[RawPage], stats: &mut ExtractionStats) -> Vec<AttendanceRecord> {
        let mut records = Vec::new();

        for page in pages {
            if self.classifier.classify(&page.text) != PageDomain::Attendance {
                continue;
            }
            stats.count_page(PageDomain::Attendance);

            for (table_index, table) in page.tables.iter().enumerate() {
                let accepted = self.validator.is_domain_table(table, PageDomain::Attendance);
                stats.count_table(accepted);
                if !accepted {
                    continue;
                }
                records.extend(self.extract_from_table(table, page.number, table_index));
            }

            records.extend(self.extract_from_text(&page.text, page.number));
        }

        let unique = self.deduplicate(records, stats);
        info!("extracted {} attendance records", unique.len());
        unique
    }

    fn extract_from_table(
        &self,
        table: &RawTable,
        page: u32,
        table_index: usize,
    ) -> Vec<AttendanceRecord> {
        let mut records = Vec::new();
        if table.row_count() < 2 {
            return records;
        }

        let header_index = find_header_row(table, ATTENDANCE_TABLE_KEYWORDS).unwrap_or(0);
        let headers = &table.rows[header_index];

        for (offset, row) in table.rows[header_index + 1..].iter().enumerate() {
            if row.len() < 3 {
                continue;
            }
            let Some(grade) = self.grade_from_row(row) else {
                continue;
            };

            let row_index = header_index + 1 + offset;
            let provenance = Provenance::table(page, table_index, row_index)
                .with_confidence(TABLE_CONFIDENCE);
            let mut record = AttendanceRecord::annual(grade, provenance);

            // standard layout: 결석 at cols 2-4, 지각 at 5-7, 조퇴 at 8-10,
            // each as 질병/미인정/기타
            record.absence.disease = cell_count(row.get(2));
            record.absence.unexcused = cell_count(row.get(3));
            record.absence.other = cell_count(row.get(4));
            record.tardiness.disease = cell_count(row.get(5));
            record.tardiness.unexcused = cell_count(row.get(6));
            record.tardiness.other = cell_count(row.get(7));
            record.early_leave.disease = cell_count(row.get(8));
            record.early_leave.unexcused = cell_count(row.get(9));
            record.early_leave.other = cell_count(row.get(10));
            if let Some(notes) = row.get(14).map(|c| c.trim()) {
                if !notes.is_empty() && notes != "." {
                    record.special_notes = notes.to_string();
                }
            }

            apply_header_overrides(headers, row, &mut record);

            debug!("page {}: attendance row for grade {}", page, grade);
            records.push(record);
        }

        records
    }

    /// Grade from the first cell when it is a bare digit, otherwise from a
    /// `N학년` marker anywhere in the row.
    fn grade_from_row(&self, row: &[String]) -> Option<u8> {
        if let Some(first) = row.first().map(|c| c.trim()) {
            if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(grade) = first.parse::<u8>() {
                    if grade_in_range(grade) {
                        return Some(grade);
                    }
                }
            }
        }

        let joined = row.join(" ");
        self.grade_marker
            .captures(&joined)
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .filter(|g| grade_in_range(*g))
    }

    fn extract_from_text(&self, text: &str, page: u32) -> Vec<AttendanceRecord> {
        let mut records = Vec::new();

        for caps in self.detailed.captures_iter(text) {
            let Some(grade) = parse_in_range(&caps[1], grade_in_range) else {
                continue;
            };
            let mut record = AttendanceRecord::annual(grade, Provenance::text(page));
            record.semester = caps
                .get(2)
                .and_then(|m| parse_in_range(m.as_str(), semester_in_range));
            record.school_days = caps[3].parse().ok();
            record.attendance_days = caps[4].parse().ok();
            // per-cause breakdown is not stated in prose, counts land in 기타
            record.tardiness.other = caps[5].parse().unwrap_or(0);
            record.early_leave.other = caps[6].parse().unwrap_or(0);
            record.absence.other = caps[7].parse().unwrap_or(0);
            records.push(record);
        }

        for caps in self.simple.captures_iter(text) {
            let Some(grade) = parse_in_range(&caps[1], grade_in_range) else {
                continue;
            };
            let mut record = AttendanceRecord::annual(grade, Provenance::text(page));
            record.attendance_days = caps[2].parse().ok();
            record.tardiness.other = caps[3].parse().unwrap_or(0);
            record.early_leave.other = caps[4].parse().unwrap_or(0);
            record.absence.other = caps[5].parse().unwrap_or(0);
            records.push(record);
        }

        records
    }

    fn deduplicate(
        &self,
        records: Vec<AttendanceRecord>,
        stats: &mut ExtractionStats,
    ) -> Vec<AttendanceRecord> {
        let mut unique: Vec<AttendanceRecord> = Vec::new();

        for record in records {
            let key = record.dedup_key();
            match unique.iter().position(|r| r.dedup_key() == key) {
                None => unique.push(record),
                Some(index) => {
                    stats.duplicates_dropped += 1;
                    warn!(
                        "duplicate attendance record for grade {} semester {:?} (page {})",
                        record.grade, record.semester, record.provenance.page
                    );
                    if self.dedup == DedupPolicy::Merge {
                        merge_into(&mut unique[index], record);
                    }
                }
            }
        }

        unique
    }
}

impl Default for AttendanceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold `later` into `kept`, preserving `kept`'s provenance.
fn merge_into(kept: &mut AttendanceRecord, later: AttendanceRecord) {
    kept.absence = kept.absence.max(&later.absence);
    kept.tardiness = kept.tardiness.max(&later.tardiness);
    kept.early_leave = kept.early_leave.max(&later.early_leave);
    kept.school_days = kept.school_days.or(later.school_days);
    kept.attendance_days = kept.attendance_days.or(later.attendance_days);

    if !later.special_notes.is_empty() && !kept.special_notes.contains(later.special_notes.as_str())
    {
        if kept.special_notes.is_empty() {
            kept.special_notes = later.special_notes;
        } else {
            kept.special_notes.push_str("; ");
            kept.special_notes.push_str(&later.special_notes);
        }
    }
}

/// Header-driven remapping for tables that deviate from the standard
/// column order. Runs after positional mapping and overrides it.
fn apply_header_overrides(headers: &[String], row: &[String], record: &mut AttendanceRecord) {
    for (index, header) in headers.iter().enumerate() {
        let Some(cell) = row.get(index) else {
            continue;
        };
        let header = header.to_lowercase();
        let count = cell_count(Some(cell));

        if header.contains("결석") {
            if header.contains("질병") {
                record.absence.disease = count;
            } else if header.contains("미인정") {
                record.absence.unexcused = count;
            } else if header.contains("기타") {
                record.absence.other = count;
            }
        } else if header.contains("지각") {
            if header.contains("질병") {
                record.tardiness.disease = count;
            } else if header.contains("미인정") {
                record.tardiness.unexcused = count;
            } else if header.contains("기타") {
                record.tardiness.other = count;
            }
        } else if header.contains("조퇴") {
            if header.contains("질병") {
                record.early_leave.disease = count;
            } else if header.contains("미인정") {
                record.early_leave.unexcused = count;
            } else if header.contains("기타") {
                record.early_leave.other = count;
            }
        } else if header.contains("특기") || header.contains("비고") {
            let cell = cell.trim();
            if !cell.is_empty() && cell != "." {
                record.special_notes = cell.to_string();
            }
        }
    }
}

/// Counter cell to integer. Placeholders (empty, `.`, `-`) and anything
/// non-numeric count as zero.
fn cell_count(cell: Option<&String>) -> u32 {
    let Some(cell) = cell else {
        return 0;
    };
    let value = cell.trim();
    if value.is_empty() || value == "." || value == "-" {
        return 0;
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        value.parse().unwrap_or(0)
    } else {
        0
    }
}

fn parse_in_range(text: &str, in_range: fn(u8) -> bool) -> Option<u8> {
    text.parse::<u8>().ok().filter(|v| in_range(*v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    const PAGE_TEXT: &str = "출결상황 출석일수 지각 조퇴 결석";

    fn standard_table() -> RawTable {
        RawTable::from_rows([
            vec![
                "학년", "수업일수", "결석질병", "결석미인정", "결석기타", "지각질병",
                "지각미인정", "지각기타", "조퇴질병", "조퇴미인정", "조퇴기타", "결과질병",
                "결과미인정", "결과기타", "특기사항",
            ],
            vec![
                "1", "190", "2", "0", "0", "1", "0", "3", "0", "0", "1", "0", "0", "0", ".",
            ],
            vec![
                "2", "192", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "개근",
            ],
        ])
    }

    #[test]
    fn test_extract_standard_table() {
        let extractor = AttendanceExtractor::new();
        let mut stats = ExtractionStats::default();
        let pages = vec![RawPage::new(3, PAGE_TEXT).with_table(standard_table())];

        let records = extractor.extract(&pages, &mut stats);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.grade, 1);
        assert_eq!(first.semester, None);
        assert_eq!(first.absence.disease, 2);
        assert_eq!(first.tardiness.disease, 1);
        assert_eq!(first.tardiness.other, 3);
        assert_eq!(first.early_leave.other, 1);
        // placeholder dot is not a note
        assert_eq!(first.special_notes, "");
        assert_eq!(first.provenance.confidence, TABLE_CONFIDENCE);
        assert_eq!(first.provenance.method, ExtractionMethod::Table);

        assert_eq!(records[1].grade, 2);
        assert_eq!(records[1].special_notes, "개근");
        assert_eq!(records[1].counter_total(), 0);

        assert_eq!(stats.attendance_pages, 1);
        assert_eq!(stats.tables_accepted, 1);
    }

    #[test]
    fn test_row_without_grade_dropped() {
        let extractor = AttendanceExtractor::new();
        let table = RawTable::from_rows([
            vec!["학년", "수업일수", "결석질병", "지각질병", "조퇴질병", "기타"],
            vec!["합계", "570", "2", "1", "0", "0"],
        ]);
        assert!(extractor.extract_from_table(&table, 1, 0).is_empty());
    }

    #[test]
    fn test_grade_from_row_marker_fallback() {
        let extractor = AttendanceExtractor::new();
        let row = vec!["제2학년".to_string(), "190".to_string(), "0".to_string()];
        assert_eq!(extractor.grade_from_row(&row), Some(2));
        let out_of_range = vec!["5".to_string(), "190".to_string(), "0".to_string()];
        assert_eq!(extractor.grade_from_row(&out_of_range), None);
    }

    #[test]
    fn test_detailed_text_pattern() {
        let extractor = AttendanceExtractor::new();
        let records = extractor.extract_from_text(
            "1학년 1학기 수업일수 190 출석일수 188 지각 1 조퇴 0 결석 2",
            4,
        );
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.grade, 1);
        assert_eq!(rec.semester, Some(1));
        assert_eq!(rec.school_days, Some(190));
        assert_eq!(rec.attendance_days, Some(188));
        assert_eq!(rec.tardiness.other, 1);
        assert_eq!(rec.early_leave.other, 0);
        assert_eq!(rec.absence.other, 2);
        assert_eq!(rec.provenance.method, ExtractionMethod::TextPattern);
    }

    #[test]
    fn test_detailed_pattern_without_semester() {
        let extractor = AttendanceExtractor::new();
        let records = extractor.extract_from_text(
            "2학년 수업일수 192 출석일수 192 지각 0 조퇴 0 결석 0",
            4,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].semester, None);
    }

    #[test]
    fn test_simple_text_pattern_never_claims_semester() {
        let extractor = AttendanceExtractor::new();
        let records = extractor.extract_from_text("3학년 출석 190 지각 2 조퇴 1 결석 3", 9);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.grade, 3);
        assert_eq!(rec.semester, None);
        assert_eq!(rec.attendance_days, Some(190));
        assert_eq!(rec.tardiness.other, 2);
        assert_eq!(rec.absence.other, 3);
    }

    #[test]
    fn test_first_wins_dedup_prefers_table() {
        let extractor = AttendanceExtractor::new();
        let mut stats = ExtractionStats::default();
        let page = RawPage::new(
            3,
            "출결상황 출석일수 지각 조퇴 결석\n1학년 출석 185 지각 9 조퇴 9 결석 9",
        )
        .with_table(standard_table());

        let records = extractor.extract(&[page], &mut stats);
        // table rows for grades 1 and 2, the grade-1 text record is dropped
        assert_eq!(records.len(), 2);
        let grade1 = records.iter().find(|r| r.grade == 1).unwrap();
        assert_eq!(grade1.provenance.method, ExtractionMethod::Table);
        assert_eq!(grade1.tardiness.other, 3);
        assert_eq!(stats.duplicates_dropped, 1);
    }

    #[test]
    fn test_merge_policy_folds_counts_and_notes() {
        let extractor = AttendanceExtractor::new().with_dedup_policy(DedupPolicy::Merge);
        let mut stats = ExtractionStats::default();

        let mut a = AttendanceRecord::annual(1, Provenance::table(3, 0, 1));
        a.absence.disease = 2;
        a.special_notes = "개근".to_string();
        let mut b = AttendanceRecord::annual(1, Provenance::text(3));
        b.absence.disease = 1;
        b.absence.other = 4;
        b.attendance_days = Some(188);
        b.special_notes = "질병결석 있음".to_string();

        let merged = extractor.deduplicate(vec![a, b], &mut stats);
        assert_eq!(merged.len(), 1);
        let rec = &merged[0];
        assert_eq!(rec.absence.disease, 2);
        assert_eq!(rec.absence.other, 4);
        assert_eq!(rec.attendance_days, Some(188));
        assert_eq!(rec.special_notes, "개근; 질병결석 있음");
        assert_eq!(rec.provenance.method, ExtractionMethod::Table);
        assert_eq!(stats.duplicates_dropped, 1);
    }

    #[test]
    fn test_cell_count_placeholders() {
        assert_eq!(cell_count(Some(&String::from("3"))), 3);
        assert_eq!(cell_count(Some(&String::from("."))), 0);
        assert_eq!(cell_count(Some(&String::from("-"))), 0);
        assert_eq!(cell_count(Some(&String::from(""))), 0);
        assert_eq!(cell_count(Some(&String::from("3일"))), 0);
        assert_eq!(cell_count(None), 0);
    }
}
