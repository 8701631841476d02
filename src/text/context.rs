//! Grade/semester context markers and page-to-page inheritance.

use crate::model::{ExtractionContext, MarkerKind};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;

/// Valid school grade range.
pub(crate) fn grade_in_range(grade: u8) -> bool {
    (1..=3).contains(&grade)
}

/// Valid semester range.
pub(crate) fn semester_in_range(semester: u8) -> bool {
    (1..=2).contains(&semester)
}

/// Scans page text for grade/semester markers.
///
/// Markers are tried in declaration order and the first range-valid match
/// wins. Later markers are looser fallbacks with lower fixed confidence,
/// so the order is part of the contract, not an implementation detail.
pub struct ContextTracker {
    markers: Vec<(MarkerKind, Regex)>,
}

impl ContextTracker {
    /// Create a tracker with the built-in marker patterns.
    pub fn new() -> Self {
        Self {
            markers: vec![
                (MarkerKind::Bracket, Regex::new(r"\[(\d+)학년\]").unwrap()),
                (
                    MarkerKind::GradeSemester,
                    Regex::new(r"(\d+)학년\s*(\d+)학기").unwrap(),
                ),
                (MarkerKind::Dash, Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap()),
                (MarkerKind::Ordinal, Regex::new(r"제\s*(\d+)\s*학년").unwrap()),
            ],
        }
    }

    /// First range-valid marker on the page, if any.
    ///
    /// Unlike [`resolve`](Self::resolve) this does not inherit or fall
    /// back: no marker means `None`.
    pub fn find_marker(&self, text: &str, page: u32) -> Option<ExtractionContext> {
        for (kind, regex) in &self.markers {
            if let Some(ctx) = first_valid_match(*kind, regex, text, page) {
                debug!(
                    "page {}: {:?} marker -> grade={:?} semester={:?}",
                    page, kind, ctx.grade, ctx.semester
                );
                return Some(ctx);
            }
        }
        None
    }

    /// Resolve the context for one page.
    ///
    /// `prior` is the context of the immediately preceding page, when one
    /// was resolved; with no marker on this page it is copied at reduced
    /// confidence. With neither a marker nor a prior context the documented
    /// fallback applies. Pure given its inputs; callers thread results
    /// page-to-page, usually through a [`ContextCache`].
    pub fn resolve(
        &self,
        text: &str,
        page: u32,
        prior: Option<&ExtractionContext>,
    ) -> ExtractionContext {
        if let Some(ctx) = self.find_marker(text, page) {
            return ctx;
        }

        if let Some(prior) = prior {
            let inherited = ExtractionContext::inherited_from(prior, page.saturating_sub(1));
            debug!(
                "page {}: no marker, inheriting grade={:?} at confidence {:.2}",
                page, inherited.grade, inherited.confidence
            );
            return inherited;
        }

        debug!("page {}: no marker and no prior context, using fallback", page);
        ExtractionContext::fallback()
    }
}

impl Default for ContextTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// First match of `regex` in `text` whose captured values are in range.
fn first_valid_match(
    kind: MarkerKind,
    regex: &Regex,
    text: &str,
    page: u32,
) -> Option<ExtractionContext> {
    for caps in regex.captures_iter(text) {
        let Some(grade) = caps.get(1).and_then(|m| m.as_str().parse::<u8>().ok()) else {
            continue;
        };
        if !grade_in_range(grade) {
            continue;
        }

        let semester = match kind {
            MarkerKind::GradeSemester | MarkerKind::Dash => {
                let Some(sem) = caps.get(2).and_then(|m| m.as_str().parse::<u8>().ok()) else {
                    continue;
                };
                if !semester_in_range(sem) {
                    continue;
                }
                Some(sem)
            }
            MarkerKind::Bracket | MarkerKind::Ordinal => None,
        };

        return Some(ExtractionContext::from_marker(kind, page, grade, semester));
    }
    None
}

/// Per-run accumulator of resolved contexts, keyed by page number.
///
/// Owned by exactly one extraction run and never shared across documents;
/// concurrent runs each carry their own cache.
#[derive(Debug, Default)]
pub struct ContextCache {
    by_page: BTreeMap<u32, ExtractionContext>,
}

impl ContextCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and remember the context for a page.
    ///
    /// Inheritance reads the cached entry for `page - 1`, so callers must
    /// visit pages in ascending order for decay to chain correctly.
    pub fn resolve(&mut self, tracker: &ContextTracker, text: &str, page: u32) -> ExtractionContext {
        if let Some(ctx) = self.by_page.get(&page) {
            return ctx.clone();
        }
        let prior = page
            .checked_sub(1)
            .and_then(|prev| self.by_page.get(&prev));
        let ctx = tracker.resolve(text, page, prior);
        self.by_page.insert(page, ctx.clone());
        ctx
    }

    /// Get a previously resolved context.
    pub fn get(&self, page: u32) -> Option<&ExtractionContext> {
        self.by_page.get(&page)
    }

    /// Number of pages resolved so far.
    pub fn len(&self) -> usize {
        self.by_page.len()
    }

    /// Check if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.by_page.is_empty()
    }
}
