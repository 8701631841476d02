//! Student identity extraction from cover-page text.

use crate::model::StudentInfo;
use chrono::NaiveDate;
use log::debug;
use regex::Regex;

/// Extracts student identity fields with ordered regex patterns.
///
/// Each field has its own pattern list; the first pattern that matches
/// supplies the value and later patterns for that field are not tried.
/// Fields are independent, so a document can yield a name without a
/// birth date and vice versa.
pub struct StudentInfoExtractor {
    name_patterns: Vec<Regex>,
    birth_patterns: Vec<Regex>,
    gender_patterns: Vec<Regex>,
    school_patterns: Vec<Regex>,
}

impl StudentInfoExtractor {
    /// Create an extractor with the built-in patterns.
    pub fn new() -> Self {
        Self {
            name_patterns: compile(&[
                r"성명\s*[:：]\s*([가-힣]{2,4})\s+성별",
                r"성명\s*[:：]\s*([가-힣]{2,4})",
                r"이름\s*[:：]\s*([가-힣]{2,4})",
                r"학생\s*[:：]\s*([가-힣]{2,4})",
            ]),
            birth_patterns: compile(&[
                // resident registration number, 2-digit year
                r"주민등록번호\s*[:：]\s*(\d{2})(\d{2})(\d{2})-\d{7}",
                r"생년월일\s*[:：]\s*(\d{4})[년\-\.]\s*(\d{1,2})[월\-\.]\s*(\d{1,2})",
                r"(\d{4})[년\-\.]\s*(\d{1,2})[월\-\.]\s*(\d{1,2})[일]?.*?생",
                r"(\d{4})-(\d{2})-(\d{2})",
                r"(\d{4})\.(\d{1,2})\.(\d{1,2})",
            ]),
            gender_patterns: compile(&[r"성별\s*[:：]\s*([남여])", r"([남여])성"]),
            school_patterns: compile(&[
                r"학교명\s*[:：]\s*([가-힣]+고등학교)",
                r"([가-힣]+고등학교)",
                r"학교\s*[:：]\s*([가-힣]+고등학교)",
            ]),
        }
    }

    /// Extract whatever identity fields the text yields.
    pub fn extract(&self, text: &str) -> StudentInfo {
        let info = StudentInfo {
            name: first_capture(&self.name_patterns, text),
            birth_date: self.extract_birth_date(text),
            gender: first_capture(&self.gender_patterns, text),
            school: first_capture(&self.school_patterns, text),
        };
        debug!(
            "student info: name={:?} birth={:?} gender={:?} school={:?}",
            info.name, info.birth_date, info.gender, info.school
        );
        info
    }

    fn extract_birth_date(&self, text: &str) -> Option<NaiveDate> {
        for regex in &self.birth_patterns {
            if let Some(caps) = regex.captures(text) {
                // the matching pattern decides the field; an invalid
                // date leaves it empty rather than trying weaker patterns
                return parse_birth_date(
                    caps.get(1)?.as_str(),
                    caps.get(2)?.as_str(),
                    caps.get(3)?.as_str(),
                );
            }
        }
        None
    }
}

impl Default for StudentInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|r| r.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

/// Build a date from captured year/month/day strings.
///
/// Two-digit years come from resident registration numbers; 00..=30 maps
/// to 20xx and the rest to 19xx. Out-of-range dates yield `None`.
fn parse_birth_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = match year.len() {
        2 => {
            let short: i32 = year.parse().ok()?;
            if short <= 30 {
                2000 + short
            } else {
                1900 + short
            }
        }
        _ => year.parse().ok()?,
    };
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_extraction_priority() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("성명 : 김철수 성별 : 남");
        assert_eq!(info.name.as_deref(), Some("김철수"));
        assert_eq!(info.gender.as_deref(), Some("남"));
    }

    #[test]
    fn test_name_variants() {
        let ex = StudentInfoExtractor::new();
        assert_eq!(ex.extract("이름: 이영희").name.as_deref(), Some("이영희"));
        assert_eq!(ex.extract("학생 : 박민수").name.as_deref(), Some("박민수"));
        assert_eq!(ex.extract("성명：홍길동").name.as_deref(), Some("홍길동"));
    }

    #[test]
    fn test_birth_date_from_registration_number() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("주민등록번호 : 080315-3123456");
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(2008, 3, 15));

        let info = ex.extract("주민등록번호: 950702-1234567");
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(1995, 7, 2));
    }

    #[test]
    fn test_birth_date_explicit_forms() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("생년월일 : 2007년 11월 9일");
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(2007, 11, 9));

        let info = ex.extract("2006-04-01");
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(2006, 4, 1));

        let info = ex.extract("2008.1.23");
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(2008, 1, 23));
    }

    #[test]
    fn test_invalid_date_yields_none() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("생년월일 : 2007년 13월 40일");
        assert_eq!(info.birth_date, None);
    }

    #[test]
    fn test_school_extraction() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("학교명 : 서울고등학교");
        assert_eq!(info.school.as_deref(), Some("서울고등학교"));

        let info = ex.extract("한국대학교사범대학부설고등학교 제3학년");
        assert_eq!(
            info.school.as_deref(),
            Some("한국대학교사범대학부설고등학교")
        );
    }

    #[test]
    fn test_empty_text() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("");
        assert!(info.is_empty());
        assert_eq!(info.name_or_unknown(), "Unknown");
    }

    #[test]
    fn test_fields_are_independent() {
        let ex = StudentInfoExtractor::new();
        let info = ex.extract("성명 : 최지우\n소속 없음");
        assert_eq!(info.name.as_deref(), Some("최지우"));
        assert_eq!(info.birth_date, None);
        assert_eq!(info.gender, None);
        assert_eq!(info.school, None);
    }
}
