//! Page and table classification.

mod keywords;
mod page;
mod table;

pub use page::PageClassifier;
pub use table::{find_header_row, TableValidator};

pub(crate) use keywords::{ATTENDANCE_TABLE_KEYWORDS, GRADE_TABLE_KEYWORDS};
