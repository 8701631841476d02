//! Full-text section scans for enrollment history, creative activity
//! hours and behavioral opinion blocks.
//!
//! These sections have no reliable table form, so they are read from the
//! joined document text in one pass each. Match offsets are mapped back
//! to page numbers for provenance.

use crate::model::{
    BehavioralRecord, CreativeActivityRecord, Provenance, RawPage, SchoolHistoryRecord,
};
use crate::text::{grade_in_range, semester_in_range};
use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;

/// Substrings that end the 창의적체험활동 section.
const CREATIVE_TERMINATORS: &[&str] = &["진로", "수상", "봉사", "독서"];

/// Records produced by one [`SectionScanner::scan`] pass.
#[derive(Debug, Default)]
pub struct SectionRecords {
    pub school_history: Vec<SchoolHistoryRecord>,
    pub creative_activities: Vec<CreativeActivityRecord>,
    pub behavioral_records: Vec<BehavioralRecord>,
}

/// Scans the joined document text for section-level records.
pub struct SectionScanner {
    school_history: Regex,
    creative_head: Regex,
    creative_entry: Regex,
    behavioral_anchor: Regex,
    grade_marker: Regex,
}

impl SectionScanner {
    /// Create a scanner with the built-in patterns.
    pub fn new() -> Self {
        Self {
            school_history: Regex::new(
                r"(\d{4})[년.\- ]+(\d{1,2})[월.\- ]+(\d{1,2})[일.\s]*([가-힣]+(?:초등학교|중학교|고등학교))\s+제?(\d)학년\s+(입학|졸업)",
            )
            .unwrap(),
            creative_head: Regex::new(r"창의적\s*체험\s*활동").unwrap(),
            creative_entry: Regex::new(r"(\d+)학년\s+(\d+)학기.*?(\d+)(?:시간|분)").unwrap(),
            behavioral_anchor: Regex::new(r"(?s)행동특성.*?종합의견").unwrap(),
            grade_marker: Regex::new(r"(\d)학년").unwrap(),
        }
    }

    /// Run all three scans over the pages' joined text.
    pub fn scan(&self, pages: &[RawPage]) -> SectionRecords {
        let joined = JoinedText::from_pages(pages);
        let records = SectionRecords {
            school_history: self.school_history(&joined),
            creative_activities: self.creative_activities(&joined),
            behavioral_records: self.behavioral_records(&joined),
        };
        info!(
            "section scans: {} history, {} creative, {} behavioral records",
            records.school_history.len(),
            records.creative_activities.len(),
            records.behavioral_records.len()
        );
        records
    }

    /// Dated enrollment events (입학/졸업), calendar-invalid dates skipped.
    fn school_history(&self, joined: &JoinedText) -> Vec<SchoolHistoryRecord> {
        let mut records = Vec::new();

        for caps in self.school_history.captures_iter(&joined.text) {
            let (Some(whole), Some(school)) = (caps.get(0), caps.get(4)) else {
                continue;
            };
            let (Ok(year), Ok(month), Ok(day)) = (
                caps[1].parse::<i32>(),
                caps[2].parse::<u32>(),
                caps[3].parse::<u32>(),
            ) else {
                continue;
            };
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                debug!("skipping history event with invalid date {}-{}-{}", year, month, day);
                continue;
            };
            let Ok(grade) = caps[5].parse::<u8>() else {
                continue;
            };

            records.push(SchoolHistoryRecord {
                date,
                school_name: school.as_str().trim().to_string(),
                grade,
                event: caps[6].to_string(),
                provenance: Provenance::text(joined.page_at(whole.start())),
            });
        }

        records
    }

    /// Per-grade hour totals from the first 창의적체험활동 section.
    ///
    /// The section runs from its heading to the first terminator keyword
    /// after it; entries must sit on a single line.
    fn creative_activities(&self, joined: &JoinedText) -> Vec<CreativeActivityRecord> {
        let Some(head) = self.creative_head.find(&joined.text) else {
            return Vec::new();
        };
        let tail = &joined.text[head.end()..];
        let section_end = CREATIVE_TERMINATORS
            .iter()
            .filter_map(|t| tail.find(t))
            .min()
            .map_or(joined.text.len(), |offset| head.end() + offset);
        let section = &joined.text[head.start()..section_end];

        let mut records = Vec::new();
        for caps in self.creative_entry.captures_iter(section) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(grade) = parse_u8(&caps[1]).filter(|g| grade_in_range(*g)) else {
                continue;
            };
            let Some(semester) = parse_u8(&caps[2]).filter(|s| semester_in_range(*s)) else {
                continue;
            };

            records.push(CreativeActivityRecord {
                grade,
                semester,
                activity_type: "창의적체험활동".to_string(),
                hours: caps[3].parse().unwrap_or(0),
                provenance: Provenance::text(joined.page_at(head.start() + whole.start())),
            });
        }

        records
    }

    /// 행동특성 및 종합의견 narrative blocks.
    ///
    /// The grade is the last in-range `N학년` mention before the block
    /// heading; the content is the opinion-character run after it.
    fn behavioral_records(&self, joined: &JoinedText) -> Vec<BehavioralRecord> {
        let mut records = Vec::new();

        for anchor in self.behavioral_anchor.find_iter(&joined.text) {
            let grade = self
                .grade_marker
                .captures_iter(&joined.text[..anchor.start()])
                .filter_map(|caps| parse_u8(&caps[1]))
                .filter(|g| grade_in_range(*g))
                .last();

            let content: String = joined.text[anchor.end()..]
                .chars()
                .take_while(|c| is_opinion_char(*c))
                .collect();
            let content = content.trim();
            if content.chars().count() <= 10 {
                continue;
            }

            records.push(BehavioralRecord {
                grade,
                content: content.to_string(),
                provenance: Provenance::text(joined.page_at(anchor.start())),
            });
        }

        records
    }
}

impl Default for SectionScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages joined with newlines, with byte offsets kept for mapping match
/// positions back to page numbers.
struct JoinedText {
    text: String,
    page_starts: Vec<(usize, u32)>,
}

impl JoinedText {
    fn from_pages(pages: &[RawPage]) -> Self {
        let mut text = String::new();
        let mut page_starts = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                text.push('\n');
            }
            page_starts.push((text.len(), page.number));
            text.push_str(&page.text);
        }
        Self { text, page_starts }
    }

    fn page_at(&self, offset: usize) -> u32 {
        self.page_starts
            .iter()
            .rev()
            .find(|(start, _)| *start <= offset)
            .map_or(0, |(_, page)| *page)
    }
}

fn parse_u8(text: &str) -> Option<u8> {
    text.parse().ok()
}

/// Characters allowed in an opinion block: hangul, whitespace and light
/// punctuation. Anything else ends the block.
fn is_opinion_char(c: char) -> bool {
    ('가'..='힣').contains(&c) || c.is_whitespace() || matches!(c, ',' | '.' | '-' | '(' | ')')
}
