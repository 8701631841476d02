//! Student identity fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel used by consumers when no student name could be extracted.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Identity fields extracted from the first pages of a document.
///
/// Every field is optional: the pipeline reports what it found and nothing
/// more. The "Unknown" name fallback belongs to the consuming boundary, so
/// it is offered as a helper and never written into the struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentInfo {
    /// Student name (성명), 2..=4 hangul syllables
    pub name: Option<String>,

    /// Birth date (생년월일), normalized
    pub birth_date: Option<NaiveDate>,

    /// Gender as written (남/여)
    pub gender: Option<String>,

    /// School name or equivalent free text
    pub school: Option<String>,
}

impl StudentInfo {
    /// Create an empty identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name, or the consumer-facing sentinel when none was extracted.
    pub fn name_or_unknown(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }

    /// Check whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.birth_date.is_none()
            && self.gender.is_none()
            && self.school.is_none()
    }

    /// Number of populated fields.
    pub fn field_count(&self) -> usize {
        [
            self.name.is_some(),
            self.birth_date.is_some(),
            self.gender.is_some(),
            self.school.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_student() {
        let student = StudentInfo::new();
        assert!(student.is_empty());
        assert_eq!(student.field_count(), 0);
        assert_eq!(student.name_or_unknown(), "Unknown");
    }

    #[test]
    fn test_populated_student() {
        let student = StudentInfo {
            name: Some("김민준".to_string()),
            birth_date: NaiveDate::from_ymd_opt(2006, 3, 15),
            gender: Some("남".to_string()),
            school: None,
        };
        assert!(!student.is_empty());
        assert_eq!(student.field_count(), 3);
        assert_eq!(student.name_or_unknown(), "김민준");
    }
}
