//! Narrative subject-commentary extraction (세부능력 및 특기사항).
//!
//! Narrative content is the least structured domain: entries are long
//! free-text paragraphs that routinely run past a page break, so this
//! extractor stitches split entries back together before pattern
//! matching and relies on a containment dedup to drop the truncated
//! fragments that still slip through.

use crate::classify::{PageClassifier, TableValidator};
use crate::model::{
    DetailRecord, ExtractionMethod, ExtractionStats, PageDomain, Provenance, RawPage, RawTable,
};
use crate::text::{semester_in_range, ContextTracker};
use log::{debug, info, warn};
use regex::Regex;

/// Sentence fragments that open a page when an entry was split by the
/// page break.
const CONTINUATION_MARKERS: &[&str] = &["을 함.", "을 통해", "에 대해", "을 위해", "을 하며"];

/// Strings that disqualify a candidate subject name.
const SUBJECT_DENYLIST: &[&str] = &["세부능력", "특기사항", "과목", "교과", "헤더", "표", "페이지"];

const SUBJECT_COLUMN_KEYWORDS: &[&str] = &["과목", "교과", "과목명", "교과명"];
const CONTENT_COLUMN_KEYWORDS: &[&str] =
    &["세부능력", "특기사항", "내용", "세특", "세부", "능력", "특기"];

/// Extracts narrative per-subject commentary records.
///
/// Grade and semester rarely appear next to the narrative text, so the
/// extractor carries them across pages: an explicit marker on the page
/// wins, then the identity of the previous productive page, then a
/// position-based estimate.
pub struct DetailExtractor {
    classifier: PageClassifier,
    validator: TableValidator,
    tracker: ContextTracker,
    line_subject: Regex,
    semester_anchor: Regex,
    slice_subject: Regex,
    course_anchor: Regex,
    generic_anchor: Regex,
}

impl DetailExtractor {
    /// Create an extractor with the built-in patterns.
    pub fn new() -> Self {
        Self {
            classifier: PageClassifier::new(),
            validator: TableValidator::new(),
            tracker: ContextTracker::new(),
            line_subject: Regex::new(r"([가-힣]{2,10})\s*[:：]\s*(.+)").unwrap(),
            semester_anchor: Regex::new(r"\((\d)학기\)").unwrap(),
            slice_subject: Regex::new(r"^([가-힣\s]+?)\s*[:：]\s*").unwrap(),
            course_anchor: Regex::new(
                r"([가-힣]+(?:과학|수학|국어|영어|사회|체육|음악|미술|기술|가정|정보|한문|윤리|지리|역사|물리|화학|생물|지구과학))\s*[:：]\s*",
            )
            .unwrap(),
            generic_anchor: Regex::new(r"([가-힣]{2,10})\s*[:：]\s*").unwrap(),
        }
    }

    /// Extract detail records from a document's pages.
    ///
    /// Pages must be in document order; the carried grade/semester and
    /// the page-stitching buffer both depend on it.
    pub fn extract(&self, pages: &[RawPage], stats: &mut ExtractionStats) -> Vec<DetailRecord> {
        let mut current_grade: Option<u8> = None;
        let mut current_semester: Option<u8> = None;
        let mut previous_text = String::new();
        let mut records = Vec::new();

        for page in pages {
            if self.classifier.classify(&page.text) != PageDomain::Detail {
                continue;
            }
            stats.count_page(PageDomain::Detail);

            let page_records = self.extract_from_page(
                page,
                current_grade,
                current_semester,
                &previous_text,
                stats,
            );
            if let Some(first) = page_records.first() {
                current_grade = Some(first.grade);
                current_semester = Some(first.semester);
            }
            records.extend(page_records);

            // the unmodified text is kept for stitching with the next
            // detail page, non-detail pages in between do not clear it
            previous_text = page.text.clone();
        }

        let unique = self.deduplicate(records, stats);
        info!("extracted {} detail records", unique.len());
        unique
    }

    fn extract_from_page(
        &self,
        page: &RawPage,
        current_grade: Option<u8>,
        current_semester: Option<u8>,
        previous_text: &str,
        stats: &mut ExtractionStats,
    ) -> Vec<DetailRecord> {
        let marker = self.tracker.find_marker(&page.text, page.number);
        let page_grade = marker
            .as_ref()
            .and_then(|m| m.grade)
            .or(current_grade)
            .unwrap_or_else(|| estimate_grade(page.number));
        let page_semester = marker
            .as_ref()
            .and_then(|m| m.semester)
            .or(current_semester)
            .unwrap_or(1);

        let combined = self.stitch_pages(previous_text, &page.text, page.number);

        let mut records = Vec::new();
        for (table_index, table) in page.tables.iter().enumerate() {
            let accepted = self.validator.is_domain_table(table, PageDomain::Detail);
            stats.count_table(accepted);
            if !accepted {
                continue;
            }
            records.extend(self.extract_from_table(
                table,
                page.number,
                table_index,
                page_grade,
                page_semester,
            ));
        }

        for (subject, content, semester) in self.subject_details(&combined) {
            let semester = semester.unwrap_or(page_semester);
            records.push(DetailRecord::new(
                subject,
                content,
                page_grade,
                semester,
                Provenance::text(page.number),
            ));
        }

        records
    }

    /// Splice an entry split by the page break back together.
    ///
    /// When one of the previous page's last lines holds an unterminated
    /// `subject: partial sentence` fragment and one of the current page's
    /// first lines starts with a continuation fragment, the two are joined
    /// and the consumed opening lines are dropped from the current text.
    fn stitch_pages(&self, previous: &str, current: &str, page: u32) -> String {
        if previous.is_empty() {
            return current.to_string();
        }

        let previous_lines: Vec<&str> = previous.trim().split('\n').collect();
        let current_lines: Vec<&str> = current.trim().split('\n').collect();

        for i in 0..previous_lines.len().min(5) {
            let line = previous_lines[previous_lines.len() - 1 - i];
            let Some(caps) = self.line_subject.captures(line) else {
                continue;
            };
            let subject = caps[1].to_string();
            let content_start = caps[2].trim().to_string();

            // a finished sentence needs no stitching
            if content_start.chars().count() >= 100 && content_start.ends_with('.') {
                continue;
            }

            for (j, next_line) in current_lines.iter().take(10).enumerate() {
                if !CONTINUATION_MARKERS.iter().any(|m| next_line.starts_with(m)) {
                    continue;
                }

                let mut head: Vec<String> = previous_lines[..previous_lines.len() - 1 - i]
                    .iter()
                    .map(|l| l.to_string())
                    .collect();
                head.push(format!("{subject}: {content_start}{next_line}"));
                let tail = current_lines[j + 1..].join("\n");

                info!(
                    "pages {}-{}: stitched split entry for {}",
                    page.saturating_sub(1),
                    page,
                    subject
                );
                return format!("{}\n{}", head.join("\n"), tail);
            }
        }

        current.to_string()
    }

    fn extract_from_table(
        &self,
        table: &RawTable,
        page: u32,
        table_index: usize,
        grade: u8,
        semester: u8,
    ) -> Vec<DetailRecord> {
        if table.row_count() < 2 {
            return Vec::new();
        }

        let headers = &table.rows[0];
        let subject_col = find_column(headers, SUBJECT_COLUMN_KEYWORDS)
            .or_else(|| (!headers.is_empty()).then_some(0));
        let content_col = find_column(headers, CONTENT_COLUMN_KEYWORDS)
            .or_else(|| (headers.len() > 1).then_some(1));

        let (Some(subject_col), Some(content_col)) = (subject_col, content_col) else {
            return self.table_as_text(table, page, table_index, grade, semester);
        };

        let mut records = Vec::new();
        for (row_index, row) in table.rows.iter().enumerate().skip(1) {
            if row.len() <= subject_col.max(content_col) {
                continue;
            }
            let subject = row[subject_col].trim();
            let content = row[content_col].trim();
            if !is_valid_detail(subject, content) {
                continue;
            }
            records.push(DetailRecord::new(
                subject,
                content,
                grade,
                semester,
                Provenance::table(page, table_index, row_index),
            ));
            debug!("page {}: detail row for {} ({}학년)", page, subject, grade);
        }
        records
    }

    /// Last-resort path for tables whose subject/content columns cannot be
    /// identified: flatten the data rows and run the text patterns on them.
    fn table_as_text(
        &self,
        table: &RawTable,
        page: u32,
        table_index: usize,
        grade: u8,
        semester: u8,
    ) -> Vec<DetailRecord> {
        warn!(
            "page {} table {}: subject/content columns not found, treating as text",
            page, table_index
        );

        let text = table.rows[1..]
            .iter()
            .map(|row| {
                row.iter()
                    .map(String::as_str)
                    .filter(|cell| !cell.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.subject_details(&text)
            .into_iter()
            .map(|(subject, content, _)| {
                let provenance = Provenance {
                    page,
                    table_index: Some(table_index),
                    row_index: None,
                    method: ExtractionMethod::TableAsText,
                    confidence: 1.0,
                    context: None,
                };
                DetailRecord::new(subject, content, grade, semester, provenance)
            })
            .collect()
    }

    /// Run all three subject/content patterns over `text`.
    ///
    /// The patterns deliberately overlap; the dedup pass collapses records
    /// found by more than one of them. Returned tuples are
    /// `(subject, content, semester)` with semester known only for the
    /// `(N학기)` form.
    fn subject_details(&self, text: &str) -> Vec<(String, String, Option<u8>)> {
        let mut found = Vec::new();

        // (N학기)과목: 내용, each block ends where the next (N학기) begins
        let mut anchors: Vec<(usize, usize, u8)> = Vec::new();
        for caps in self.semester_anchor.captures_iter(text) {
            let (Some(m), Some(sem)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Ok(semester) = sem.as_str().parse::<u8>() else {
                continue;
            };
            anchors.push((m.start(), m.end(), semester));
        }
        for (i, &(_, end, semester)) in anchors.iter().enumerate() {
            let slice_end = anchors.get(i + 1).map_or(text.len(), |a| a.0);
            let slice = &text[end..slice_end];
            let Some(caps) = self.slice_subject.captures(slice) else {
                continue;
            };
            let (Some(m), Some(subject)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let subject = subject.as_str().trim();
            let content = slice[m.end()..].trim();
            if is_valid_detail(subject, content) {
                let semester = semester_in_range(semester).then_some(semester);
                found.push((subject.to_string(), content.to_string(), semester));
            }
        }

        // 과목명: 내용 with a recognized course word, then the generic form
        found.extend(self.anchored_details(&self.course_anchor, text));
        found.extend(self.anchored_details(&self.generic_anchor, text));

        found
    }

    /// Subjects found by `anchor`, each taking the text up to the next
    /// anchor as content. Content must be long and colon-free, which is
    /// what keeps these loose patterns from swallowing table headers and
    /// key-value lines.
    fn anchored_details(&self, anchor: &Regex, text: &str) -> Vec<(String, String, Option<u8>)> {
        let mut anchors: Vec<(usize, usize, String)> = Vec::new();
        for caps in anchor.captures_iter(text) {
            let (Some(m), Some(subject)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            anchors.push((m.start(), m.end(), subject.as_str().to_string()));
        }

        let mut found = Vec::new();
        for (i, (_, end, subject)) in anchors.iter().enumerate() {
            let span_end = anchors.get(i + 1).map_or(text.len(), |a| a.0);
            let span = &text[*end..span_end];
            if span.chars().count() < 50 || span.contains(':') || span.contains('：') {
                continue;
            }
            let content = span.trim();
            if is_valid_detail(subject, content) {
                found.push((subject.clone(), content.to_string(), None));
            }
        }
        found
    }

    /// Containment dedup for partial-vs-complete duplicates.
    ///
    /// Records are sorted longest-first, then a record is dropped when an
    /// already accepted record with the same grade/semester/subject starts
    /// with its 50-character content prefix. Idempotent.
    fn deduplicate(
        &self,
        mut records: Vec<DetailRecord>,
        stats: &mut ExtractionStats,
    ) -> Vec<DetailRecord> {
        records.sort_by(|a, b| b.content_chars().cmp(&a.content_chars()));

        let mut unique: Vec<DetailRecord> = Vec::new();
        for record in records {
            let prefix: String = record.content.chars().take(50).collect();
            let duplicate = unique.iter().any(|kept| {
                kept.grade == record.grade
                    && kept.semester == record.semester
                    && kept.subject == record.subject
                    && kept.content.starts_with(prefix.as_str())
            });
            if duplicate {
                stats.duplicates_dropped += 1;
                debug!(
                    "dropping contained duplicate of {} ({}학년 {}학기)",
                    record.subject, record.grade, record.semester
                );
            } else {
                unique.push(record);
            }
        }
        unique
    }
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Grade guess from page position, for pages with no marker and no carried
/// context. Transcripts order grades front to back.
fn estimate_grade(page: u32) -> u8 {
    match page {
        0..=8 => 1,
        9..=16 => 2,
        _ => 3,
    }
}

fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| keywords.iter().any(|k| h.contains(k)))
}

fn is_valid_detail(subject: &str, content: &str) -> bool {
    is_valid_subject(subject) && content.chars().count() >= 20
}

fn is_valid_subject(subject: &str) -> bool {
    let chars = subject.chars().count();
    if !(2..=20).contains(&chars) {
        return false;
    }
    !SUBJECT_DENYLIST.iter().any(|k| subject.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = "세부능력 및 특기사항";

    fn long_content(seed: &str) -> String {
        format!("{seed} 수업에서 탐구 주제를 스스로 정하고 자료를 조사하여 발표하였으며 친구들의 질문에 논리적으로 답변함")
    }

    #[test]
    fn test_extract_table_records() {
        let extractor = DetailExtractor::new();
        let mut stats = ExtractionStats::default();
        let table = RawTable::from_rows([
            vec!["과목".to_string(), "세부능력 및 특기사항".to_string()],
            vec!["국어".to_string(), long_content("문학")],
            vec!["미적분".to_string(), long_content("수학")],
        ]);
        let pages = vec![RawPage::new(9, format!("[1학년] {DETAIL_PAGE}")).with_table(table)];

        let records = extractor.extract(&pages, &mut stats);
        assert_eq!(records.len(), 2);
        let korean = records.iter().find(|r| r.subject == "국어").unwrap();
        assert_eq!(korean.grade, 1);
        assert_eq!(korean.semester, 1);
        assert_eq!(korean.provenance.method, ExtractionMethod::Table);
        assert_eq!(korean.provenance.row_index, Some(1));
        assert_eq!(stats.detail_pages, 1);
    }

    #[test]
    fn test_invalid_rows_filtered() {
        let extractor = DetailExtractor::new();
        let table = RawTable::from_rows([
            vec!["과목".to_string(), "세부능력 및 특기사항".to_string()],
            // denylisted subject
            vec!["교과".to_string(), long_content("문학")],
            // content below the length floor
            vec!["국어".to_string(), "짧은 내용".to_string()],
        ]);
        let records = extractor.extract_from_table(&table, 9, 0, 1, 1);
        assert!(records.is_empty());
    }

    #[test]
    fn test_table_as_text_fallback() {
        let extractor = DetailExtractor::new();
        // single unrecognized header leaves no content column
        let table = RawTable::from_rows([
            vec!["활동내역".to_string()],
            vec!["(1학기)국어: 문학 작품을 깊이 있게 감상하고 분석함".to_string()],
        ]);
        let records = extractor.extract_from_table(&table, 9, 2, 2, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "국어");
        assert_eq!(records[0].content, "문학 작품을 깊이 있게 감상하고 분석함");
        assert_eq!(records[0].provenance.method, ExtractionMethod::TableAsText);
        assert_eq!(records[0].provenance.table_index, Some(2));
        assert_eq!(records[0].provenance.row_index, None);
        // the flattened-table path always uses the page identity
        assert_eq!(records[0].semester, 2);
    }

    #[test]
    fn test_semester_block_pattern() {
        let extractor = DetailExtractor::new();
        let text = format!(
            "(1학기)미적분: {}\n(2학기)미적분: {}",
            long_content("극한"),
            long_content("적분")
        );
        let found = extractor.subject_details(&text);
        let blocks: Vec<_> = found.iter().filter(|(_, _, sem)| sem.is_some()).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, "미적분");
        assert_eq!(blocks[0].2, Some(1));
        assert_eq!(blocks[1].2, Some(2));
        assert!(blocks[0].1.starts_with("극한"));
    }

    #[test]
    fn test_semester_block_out_of_range() {
        let extractor = DetailExtractor::new();
        let text = format!("(3학기)국어: {}", long_content("문학"));
        let found = extractor.subject_details(&text);
        let block = found.iter().find(|(s, _, _)| s == "국어").unwrap();
        assert_eq!(block.2, None);
    }

    #[test]
    fn test_course_and_generic_patterns_overlap() {
        let extractor = DetailExtractor::new();
        let text = format!("고급물리: {}", long_content("역학"));
        let found = extractor.subject_details(&text);
        // both the course-word and the generic pattern report it, dedup
        // collapses the pair later
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(s, _, _)| s == "고급물리"));
    }

    #[test]
    fn test_generic_pattern_needs_long_colon_free_content() {
        let extractor = DetailExtractor::new();
        // second colon inside the span blocks the match
        let found = extractor.subject_details("한국사: 짧음\n동아시아사: 내용 긴 줄이지만 중간에 구분자: 있음");
        assert!(found.is_empty());
    }

    #[test]
    fn test_stitch_pages_joins_split_entry() {
        let extractor = DetailExtractor::new();
        let prev = "세부능력 및 특기사항\n수학: 문제 해결 과정을 중시하며 적극적으로 탐구";
        let cur = "을 통해 수학적 사고력을 신장함.\n영어: 원서 읽기를 즐김";

        let combined = extractor.stitch_pages(prev, cur, 8);
        assert!(combined.contains(
            "수학: 문제 해결 과정을 중시하며 적극적으로 탐구을 통해 수학적 사고력을 신장함."
        ));
        assert!(combined.ends_with("영어: 원서 읽기를 즐김"));
        // the consumed opening line is gone from the current page part
        assert_eq!(combined.matches("수학적 사고력").count(), 1);
    }

    #[test]
    fn test_stitch_pages_without_continuation_marker() {
        let extractor = DetailExtractor::new();
        let prev = "수학: 문제 해결 과정을 중시하며 적극적으로 탐구";
        let cur = "영어: 원서 읽기를 즐김";
        assert_eq!(extractor.stitch_pages(prev, cur, 8), cur);
    }

    #[test]
    fn test_stitch_pages_skips_finished_sentences() {
        let extractor = DetailExtractor::new();
        let finished = format!("국어: {}{}.", long_content("문학"), long_content("독서"));
        assert!(finished.chars().count() > 100);
        let cur = "을 통해 독해력을 키움.\n다음 항목";
        assert_eq!(extractor.stitch_pages(&finished, cur, 8), cur);
    }

    #[test]
    fn test_dedup_drops_contained_fragment() {
        let extractor = DetailExtractor::new();
        let mut stats = ExtractionStats::default();
        let short = DetailRecord::new(
            "국어",
            "수업에 적극적으로 참여함",
            1,
            1,
            Provenance::text(7),
        );
        let long = DetailRecord::new(
            "국어",
            "수업에 적극적으로 참여함을 통해 발표력을 키움",
            1,
            1,
            Provenance::text(8),
        );

        let unique = extractor.deduplicate(vec![short, long], &mut stats);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].content, "수업에 적극적으로 참여함을 통해 발표력을 키움");
        assert_eq!(stats.duplicates_dropped, 1);
    }

    #[test]
    fn test_dedup_keeps_different_keys_and_divergent_content() {
        let extractor = DetailExtractor::new();
        let mut stats = ExtractionStats::default();
        let records = vec![
            DetailRecord::new("국어", "수업에 적극적으로 참여함", 1, 1, Provenance::text(7)),
            // same content under a different subject survives
            DetailRecord::new("문학", "수업에 적극적으로 참여함", 1, 1, Provenance::text(7)),
            // same key but diverging content survives
            DetailRecord::new("국어", "토론 활동을 이끌어 나감", 1, 1, Provenance::text(7)),
        ];

        let unique = extractor.deduplicate(records, &mut stats);
        assert_eq!(unique.len(), 3);
        assert_eq!(stats.duplicates_dropped, 0);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let extractor = DetailExtractor::new();
        let mut stats = ExtractionStats::default();
        let records = vec![
            DetailRecord::new("국어", long_content("문학"), 1, 1, Provenance::text(7)),
            DetailRecord::new("국어", long_content("문학"), 1, 1, Provenance::text(8)),
            DetailRecord::new("영어", long_content("독해"), 1, 1, Provenance::text(7)),
        ];

        let once = extractor.deduplicate(records, &mut stats);
        let twice = extractor.deduplicate(once.clone(), &mut stats);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_identity_carried_between_detail_pages() {
        let extractor = DetailExtractor::new();
        let mut stats = ExtractionStats::default();
        let pages = vec![
            RawPage::new(
                9,
                format!("2학년 1학기 {DETAIL_PAGE}\n물리학: {}", long_content("역학")),
            ),
            RawPage::new(10, format!("{DETAIL_PAGE}\n화학: {}", long_content("반응"))),
        ];

        let records = extractor.extract(&pages, &mut stats);
        let chemistry = records.iter().find(|r| r.subject == "화학").unwrap();
        // no marker on page 10, identity comes from page 9's records
        assert_eq!(chemistry.grade, 2);
        assert_eq!(chemistry.semester, 1);
    }

    #[test]
    fn test_estimate_grade_brackets() {
        assert_eq!(estimate_grade(8), 1);
        assert_eq!(estimate_grade(9), 2);
        assert_eq!(estimate_grade(16), 2);
        assert_eq!(estimate_grade(17), 3);
    }
}
