//! Keyword and numeric-density table validation.

use crate::classify::keywords;
use crate::model::{PageDomain, RawTable};

/// Per-domain acceptance thresholds for candidate data tables.
#[derive(Debug, Clone, Copy)]
struct DomainRule {
    keywords: &'static [&'static str],
    min_keyword_hits: usize,
    min_numeric_cells: usize,
    min_rows: usize,
}

const ACADEMIC_RULE: DomainRule = DomainRule {
    keywords: keywords::GRADE_TABLE_KEYWORDS,
    min_keyword_hits: 3,
    min_numeric_cells: 5,
    min_rows: 2,
};

const ATTENDANCE_RULE: DomainRule = DomainRule {
    keywords: keywords::ATTENDANCE_TABLE_KEYWORDS,
    min_keyword_hits: 4,
    min_numeric_cells: 3,
    min_rows: 3,
};

// narrative tables carry no numbers, so no numeric floor
const DETAIL_RULE: DomainRule = DomainRule {
    keywords: keywords::DETAIL_TABLE_KEYWORDS,
    min_keyword_hits: 1,
    min_numeric_cells: 0,
    min_rows: 2,
};

/// Judges whether a raw table is a candidate data table for a domain.
pub struct TableValidator;

impl TableValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Check a table against a domain's shape, keyword, and numeric
    /// thresholds. Domains without table extraction always reject.
    pub fn is_domain_table(&self, table: &RawTable, domain: PageDomain) -> bool {
        let rule = match domain {
            PageDomain::Academic => ACADEMIC_RULE,
            PageDomain::Attendance => ATTENDANCE_RULE,
            PageDomain::Detail => DETAIL_RULE,
            _ => return false,
        };

        // ragged or near-empty tables are rejected before the checks
        let Some(cleaned) = table.cleaned() else {
            return false;
        };

        has_shape(&cleaned, rule.min_rows)
            && keyword_hits(&cleaned, rule.keywords) >= rule.min_keyword_hits
            && numeric_cells(&cleaned) >= rule.min_numeric_cells
    }
}

impl Default for TableValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn has_shape(table: &RawTable, min_rows: usize) -> bool {
    table.row_count() >= min_rows
        && table.rows.iter().all(|row| row.len() >= 2)
        && table
            .rows
            .iter()
            .any(|row| row.iter().any(|cell| !cell.trim().is_empty()))
}

fn keyword_hits(table: &RawTable, keywords: &[&str]) -> usize {
    let text = table.plain_text().to_lowercase();
    keywords.iter().filter(|k| text.contains(**k)).count()
}

/// Cells that are purely numeric after dropping decimal points.
fn numeric_cells(table: &RawTable) -> usize {
    table
        .rows
        .iter()
        .flat_map(|row| row.iter())
        .filter(|cell| is_numeric_cell(cell))
        .count()
}

fn is_numeric_cell(cell: &str) -> bool {
    let digits: String = cell.trim().chars().filter(|c| *c != '.').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Find the header row by keyword density among the first five rows.
///
/// A row qualifies when it contains at least half of the keyword set.
pub fn find_header_row(table: &RawTable, keywords: &[&str]) -> Option<usize> {
    for (idx, row) in table.rows.iter().take(5).enumerate() {
        if row.is_empty() {
            continue;
        }
        let row_text = row
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let hits = keywords.iter().filter(|k| row_text.contains(**k)).count();
        if hits >= keywords.len() / 2 {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade_table() -> RawTable {
        RawTable::from_rows([
            vec!["학기", "교과", "과목", "단위수", "원점수/과목평균", "성취도", "석차등급"],
            vec!["1", "국어", "문학", "4", "82/71.5(14.1)", "A(186)", "2"],
            vec!["1", "수학", "수학I", "4", "78/65.2(18.3)", "B(186)", "3"],
        ])
    }

    fn attendance_table() -> RawTable {
        RawTable::from_rows([
            vec!["학년", "수업일수", "결석질병", "결석미인정", "지각기타", "조퇴질병"],
            vec!["1", "190", "2", "0", "1", "0"],
            vec!["2", "192", "0", "0", "0", "3"],
            vec!["3", "188", "1", "0", "0", "0"],
        ])
    }

    #[test]
    fn test_accepts_grade_table() {
        let validator = TableValidator::new();
        assert!(validator.is_domain_table(&grade_table(), PageDomain::Academic));
    }

    #[test]
    fn test_accepts_attendance_table() {
        let validator = TableValidator::new();
        assert!(validator.is_domain_table(&attendance_table(), PageDomain::Attendance));
    }

    #[test]
    fn test_attendance_needs_three_rows() {
        let validator = TableValidator::new();
        let short = RawTable::from_rows([
            vec!["학년", "결석질병", "결석미인정", "지각", "조퇴", "기타"],
            vec!["1", "2", "0", "1", "0", "0"],
        ]);
        assert!(!validator.is_domain_table(&short, PageDomain::Attendance));
        // same shape passes the academic floor of two rows, but fails
        // its keyword check
        assert!(!validator.is_domain_table(&short, PageDomain::Academic));
    }

    #[test]
    fn test_rejects_narrative_table_for_academic() {
        let validator = TableValidator::new();
        let narrative = RawTable::from_rows([
            vec!["과목", "세부능력 및 특기사항"],
            vec!["국어", "수업 태도가 바르고 토론에 적극 참여함"],
        ]);
        // keyword hits are insufficient and there is no numeric data
        assert!(!validator.is_domain_table(&narrative, PageDomain::Academic));
        assert!(validator.is_domain_table(&narrative, PageDomain::Detail));
    }

    #[test]
    fn test_rejects_unknown_domain() {
        let validator = TableValidator::new();
        assert!(!validator.is_domain_table(&grade_table(), PageDomain::Unknown));
        assert!(!validator.is_domain_table(&grade_table(), PageDomain::StudentInfo));
    }

    #[test]
    fn test_rejects_degenerate_table() {
        let validator = TableValidator::new();
        let blank = RawTable::from_rows([vec!["", ""], vec!["", ""], vec!["", ""]]);
        assert!(!validator.is_domain_table(&blank, PageDomain::Attendance));

        let single = RawTable::from_rows([vec!["과목", "원점수", "성취도"]]);
        assert!(!validator.is_domain_table(&single, PageDomain::Academic));
    }

    #[test]
    fn test_numeric_cell_detection() {
        assert!(is_numeric_cell("82"));
        assert!(is_numeric_cell("71.5"));
        assert!(is_numeric_cell(" 14.1 "));
        assert!(!is_numeric_cell(""));
        assert!(!is_numeric_cell("."));
        assert!(!is_numeric_cell("82/71.5"));
        assert!(!is_numeric_cell("A"));
    }

    #[test]
    fn test_find_header_row() {
        let table = grade_table();
        assert_eq!(
            find_header_row(&table, keywords::GRADE_TABLE_KEYWORDS),
            Some(0)
        );

        let shifted = RawTable::from_rows([
            vec!["2024학년도", "성적표"],
            vec!["학기", "교과", "과목", "단위수", "원점수"],
            vec!["1", "국어", "문학", "4", "82"],
        ]);
        assert_eq!(
            find_header_row(&shifted, keywords::GRADE_TABLE_KEYWORDS),
            Some(1)
        );

        let headerless = RawTable::from_rows([
            vec!["1", "국어", "문학"],
            vec!["1", "수학", "수학I"],
        ]);
        assert_eq!(
            find_header_row(&headerless, keywords::GRADE_TABLE_KEYWORDS),
            None
        );
    }
}
