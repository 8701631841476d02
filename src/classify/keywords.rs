//! Static keyword tables for page and table classification.
//!
//! Kept as data rather than code so tests can substitute their own sets
//! through the classifier builders.

use crate::model::PageDomain;

pub(crate) const STUDENT_INFO_KEYWORDS: &[&str] =
    &["인적사항", "학적사항", "성명", "생년월일", "주민등록번호"];

pub(crate) const ACADEMIC_KEYWORDS: &[&str] =
    &["교과학습발달상황", "성적", "원점수", "성취도", "과목", "교과"];

pub(crate) const ATTENDANCE_KEYWORDS: &[&str] =
    &["출결상황", "출석일수", "지각", "조퇴", "결석"];

pub(crate) const DETAIL_KEYWORDS: &[&str] = &["세부능력", "특기사항", "과목세부", "교과세부"];

pub(crate) const SCHOOL_HISTORY_KEYWORDS: &[&str] =
    &["학교별", "교육과정", "학적변동", "전학", "편입"];

pub(crate) const CREATIVE_KEYWORDS: &[&str] =
    &["창의적체험활동", "자율활동", "동아리활동", "봉사활동", "진로활동"];

/// Page-classification keyword set for a domain.
pub(crate) fn page_keywords(domain: PageDomain) -> &'static [&'static str] {
    match domain {
        PageDomain::StudentInfo => STUDENT_INFO_KEYWORDS,
        PageDomain::Academic => ACADEMIC_KEYWORDS,
        PageDomain::Attendance => ATTENDANCE_KEYWORDS,
        PageDomain::Detail => DETAIL_KEYWORDS,
        PageDomain::SchoolHistory => SCHOOL_HISTORY_KEYWORDS,
        PageDomain::Creative => CREATIVE_KEYWORDS,
        PageDomain::Unknown => &[],
    }
}

/// Keywords identifying an academic grade table.
pub(crate) const GRADE_TABLE_KEYWORDS: &[&str] = &["과목", "단위수", "원점수", "성취도", "교과"];

/// Keywords identifying an attendance table. Wider than the page set
/// since table headers spell out the cause columns.
pub(crate) const ATTENDANCE_TABLE_KEYWORDS: &[&str] =
    &["출결", "지각", "조퇴", "결석", "질병", "미인정", "기타"];

/// Keywords identifying a narrative detail table. The spaced-out form
/// appears verbatim in some layouts.
pub(crate) const DETAIL_TABLE_KEYWORDS: &[&str] = &[
    "세 부 능 력 특 기 사 항",
    "세부능력",
    "특기사항",
    "과목세부",
    "교과세부",
    "세특",
];
