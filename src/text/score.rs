//! Score cell parsing for academic tables.

use regex::Regex;

/// Components parsed out of a compound score cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScore {
    /// Raw score, rendered in canonical form
    pub raw_score: String,
    /// Subject average when the cell carried one
    pub subject_average: Option<String>,
    /// Standard deviation when the cell carried one
    pub standard_deviation: Option<String>,
}

/// Achievement level parsed from a cell like `C(186)` or a bare letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAchievement {
    /// Level letter, A..=E
    pub level: String,
    /// Enrolled student count when the cell carried one
    pub student_count: Option<u32>,
}

/// Parses compound score cells, achievement cells, and curriculum names.
pub struct ScoreParser {
    score_with_std: Regex,
    score_simple: Regex,
    achievement: Regex,
    spaces: Regex,
    slash: Regex,
    interpunct: Regex,
}

impl ScoreParser {
    /// Create a parser with the built-in patterns.
    pub fn new() -> Self {
        Self {
            score_with_std: Regex::new(r"(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)\((\d+(?:\.\d+)?)\)")
                .unwrap(),
            score_simple: Regex::new(r"(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)").unwrap(),
            achievement: Regex::new(r"([A-E])\((\d+)\)").unwrap(),
            spaces: Regex::new(r"\s+").unwrap(),
            slash: Regex::new(r"\s*/\s*").unwrap(),
            interpunct: Regex::new(r"\s*・\s*").unwrap(),
        }
    }

    /// Parse a compound score cell.
    ///
    /// Tries `raw/average(std)` first, then `raw/average`, then a bare
    /// number. Returns `None` when the cell holds none of these, leaving
    /// the caller to keep the cell verbatim.
    pub fn parse_complex_score(&self, text: &str) -> Option<ParsedScore> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = self.score_with_std.captures(text) {
            return Some(ParsedScore {
                raw_score: render(&caps[1])?,
                subject_average: Some(render(&caps[2])?),
                standard_deviation: Some(render(&caps[3])?),
            });
        }

        if let Some(caps) = self.score_simple.captures(text) {
            return Some(ParsedScore {
                raw_score: render(&caps[1])?,
                subject_average: Some(render(&caps[2])?),
                standard_deviation: None,
            });
        }

        let bare = text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
            && text.chars().any(|c| c.is_ascii_digit());
        if bare {
            if let Some(raw_score) = render(text) {
                return Some(ParsedScore {
                    raw_score,
                    subject_average: None,
                    standard_deviation: None,
                });
            }
        }

        None
    }

    /// Parse an achievement cell.
    ///
    /// `C(186)` yields the level plus the enrolled count; a bare letter
    /// in A..=E yields just the level.
    pub fn parse_achievement(&self, text: &str) -> Option<ParsedAchievement> {
        let text = text.trim();
        if let Some(caps) = self.achievement.captures(text) {
            return Some(ParsedAchievement {
                level: caps[1].to_string(),
                student_count: caps[2].parse().ok(),
            });
        }

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(level @ 'A'..='E'), None) => Some(ParsedAchievement {
                level: level.to_string(),
                student_count: None,
            }),
            _ => None,
        }
    }

    /// Normalize a curriculum or subject cell.
    ///
    /// Collapses runs of whitespace and removes spacing around `/` and
    /// `・`, which table extraction tends to scatter into names.
    pub fn clean_curriculum_text(&self, text: &str) -> String {
        let cleaned = self.spaces.replace_all(text.trim(), " ");
        let cleaned = self.slash.replace_all(&cleaned, "/");
        let cleaned = self.interpunct.replace_all(&cleaned, "・");
        cleaned.trim().to_string()
    }
}

impl Default for ScoreParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical rendering of a numeric score string.
///
/// Integral values keep one decimal place ("82" and "82.0" render the
/// same) and fractional values drop trailing zeros, so scores compare
/// equal regardless of how the source document printed them.
fn render(text: &str) -> Option<String> {
    let value: f64 = text.parse().ok()?;
    if value.fract() == 0.0 {
        Some(format!("{:.1}", value))
    } else {
        Some(format!("{}", value))
    }
}
