//! Text normalization and pattern-based parsing shared by the extractors.

mod clean;
mod context;
mod score;
mod student;

pub use clean::{collapse_whitespace, normalize_cell_text, normalize_page_text};
pub use context::{ContextCache, ContextTracker};
pub use score::{ParsedAchievement, ParsedScore, ScoreParser};
pub use student::StudentInfoExtractor;

pub(crate) use context::{grade_in_range, semester_in_range};
