//! Keyword-count page classification.

use crate::classify::keywords;
use crate::model::PageDomain;
use log::debug;

/// Scores page text against per-domain keyword sets.
///
/// Each keyword counts once regardless of how often it occurs; the
/// domain with the highest non-zero count wins and ties go to the
/// earliest domain in [`PageDomain::ALL`] order.
pub struct PageClassifier {
    sets: Vec<(PageDomain, Vec<String>)>,
}

impl PageClassifier {
    /// Create a classifier with the built-in keyword sets.
    pub fn new() -> Self {
        Self {
            sets: PageDomain::ALL
                .iter()
                .map(|&domain| {
                    let words = keywords::page_keywords(domain)
                        .iter()
                        .map(|w| w.to_string())
                        .collect();
                    (domain, words)
                })
                .collect(),
        }
    }

    /// Replace one domain's keyword set and return self.
    pub fn with_keywords<I, S>(mut self, domain: PageDomain, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if let Some(entry) = self.sets.iter_mut().find(|(d, _)| *d == domain) {
            entry.1 = words;
        } else {
            self.sets.push((domain, words));
        }
        self
    }

    /// Classify a page by its text content.
    ///
    /// Empty or unrecognizable text yields [`PageDomain::Unknown`];
    /// classification never fails.
    pub fn classify(&self, text: &str) -> PageDomain {
        if text.is_empty() {
            return PageDomain::Unknown;
        }

        let lowered = text.to_lowercase();
        let mut best = PageDomain::Unknown;
        let mut best_hits = 0usize;

        for (domain, words) in &self.sets {
            let hits = words.iter().filter(|w| lowered.contains(w.as_str())).count();
            if hits > best_hits {
                best = *domain;
                best_hits = hits;
            }
        }

        if best_hits > 0 {
            debug!("classified as {} ({} keyword hits)", best, best_hits);
        }
        best
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_academic_page() {
        let classifier = PageClassifier::new();
        let text = "교과학습발달상황\n과목 원점수 성취도 석차등급";
        assert_eq!(classifier.classify(text), PageDomain::Academic);
    }

    #[test]
    fn test_classify_attendance_page() {
        let classifier = PageClassifier::new();
        let text = "출결상황\n수업일수 출석일수 지각 조퇴 결석";
        assert_eq!(classifier.classify(text), PageDomain::Attendance);
    }

    #[test]
    fn test_classify_detail_page() {
        let classifier = PageClassifier::new();
        let text = "세부능력 및 특기사항\n국어: 수업에 적극적으로 참여함";
        assert_eq!(classifier.classify(text), PageDomain::Detail);
    }

    #[test]
    fn test_empty_text_is_unknown() {
        let classifier = PageClassifier::new();
        assert_eq!(classifier.classify(""), PageDomain::Unknown);
        assert_eq!(classifier.classify("날씨가 좋다"), PageDomain::Unknown);
    }

    #[test]
    fn test_keyword_presence_counts_once() {
        // one keyword repeated many times loses to two distinct keywords
        let classifier = PageClassifier::new();
        let text = "지각 지각 지각 지각\n성적 원점수";
        assert_eq!(classifier.classify(text), PageDomain::Academic);
    }

    #[test]
    fn test_tie_breaks_by_declaration_order() {
        let classifier = PageClassifier::new();
        // one hit each for student_info (성명) and attendance (지각);
        // student_info is declared first
        let text = "성명 지각";
        assert_eq!(classifier.classify(text), PageDomain::StudentInfo);
    }

    #[test]
    fn test_substituted_keywords() {
        let classifier = PageClassifier::new()
            .with_keywords(PageDomain::Academic, ["시험성적표"])
            .with_keywords(PageDomain::Attendance, Vec::<String>::new());
        assert_eq!(classifier.classify("시험성적표"), PageDomain::Academic);
        assert_eq!(classifier.classify("지각 조퇴 결석"), PageDomain::Unknown);
    }
}
