//! Literal find/replace over an [`EditorSurface`].
//!
//! Matches are char ranges in the document offset space. They are derived
//! state: every term change, document change, or replacement is followed by a
//! rescan, and a replacement only rescans once the surface has acknowledged
//! the edit with an [`EditReceipt`].

use crate::document::{Edit, EditError, EditReceipt, EditorSurface, Selection};
use regex::{Regex, RegexBuilder};
use std::fmt;
use tracing::{debug, warn};

/// One match in document offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSpan {
    pub from: usize,
    pub to: usize,
    /// The matched text as it appeared in the document.
    pub text: String,
}

/// What the find bar should display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// No search term.
    Idle,
    NoMatches,
    /// `current` is 1-based.
    Active { current: usize, total: usize },
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Idle => Ok(()),
            SearchStatus::NoMatches => write!(f, "No matches"),
            SearchStatus::Active { current, total } => write!(f, "{} of {}", current, total),
        }
    }
}

fn build_matcher(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!("search pattern rejected: {}", err);
            None
        }
    }
}

/// Find every non-overlapping occurrence of `pattern`, segment by segment in
/// document order. Metacharacters in `pattern` match literally.
pub fn scan<S>(surface: &S, pattern: &str, case_sensitive: bool) -> Vec<MatchSpan>
where
    S: EditorSurface + ?Sized,
{
    if pattern.is_empty() {
        return Vec::new();
    }
    let Some(matcher) = build_matcher(pattern, case_sensitive) else {
        return Vec::new();
    };
    let mut spans = Vec::new();
    for segment in surface.text_segments() {
        let text = segment.text.as_str();
        let mut byte_cursor = 0;
        let mut char_cursor = segment.start;
        for found in matcher.find_iter(text) {
            if found.start() == found.end() {
                continue;
            }
            char_cursor += text[byte_cursor..found.start()].chars().count();
            let from = char_cursor;
            let to = from + found.as_str().chars().count();
            spans.push(MatchSpan {
                from,
                to,
                text: found.as_str().to_string(),
            });
            char_cursor = to;
            byte_cursor = found.end();
        }
    }
    spans
}

/// Find-bar state: terms, options, the match list and a cyclic cursor.
#[derive(Clone, Debug, Default)]
pub struct SearchSession {
    search_term: String,
    replace_term: String,
    case_sensitive: bool,
    matches: Vec<MatchSpan>,
    current_index: usize,
    scanned_revision: Option<u64>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn replace_term(&self) -> &str {
        &self.replace_term
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn matches(&self) -> &[MatchSpan] {
        &self.matches
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&MatchSpan> {
        self.matches.get(self.current_index)
    }

    pub fn status(&self) -> SearchStatus {
        if self.search_term.is_empty() {
            SearchStatus::Idle
        } else if self.matches.is_empty() {
            SearchStatus::NoMatches
        } else {
            SearchStatus::Active {
                current: self.current_index + 1,
                total: self.matches.len(),
            }
        }
    }

    /// Change the search term, rescan, and restart at the first match.
    pub fn set_search_term<S>(&mut self, surface: &S, term: &str) -> Option<MatchSpan>
    where
        S: EditorSurface + ?Sized,
    {
        if term == self.search_term && self.is_fresh(surface) {
            return self.current().cloned();
        }
        self.search_term = term.to_string();
        self.current_index = 0;
        self.rescan(surface);
        self.current().cloned()
    }

    pub fn set_replace_term(&mut self, term: &str) {
        self.replace_term = term.to_string();
    }

    pub fn set_case_sensitive<S>(&mut self, surface: &S, case_sensitive: bool) -> Option<MatchSpan>
    where
        S: EditorSurface + ?Sized,
    {
        if case_sensitive != self.case_sensitive {
            self.case_sensitive = case_sensitive;
            self.current_index = 0;
            self.rescan(surface);
        }
        self.current().cloned()
    }

    /// Recompute matches, keeping the cursor in range.
    pub fn rescan<S>(&mut self, surface: &S)
    where
        S: EditorSurface + ?Sized,
    {
        self.matches = scan(surface, &self.search_term, self.case_sensitive);
        self.scanned_revision = Some(surface.revision());
        if self.current_index >= self.matches.len() {
            self.current_index = 0;
        }
        debug!(
            "search rescan: {} match(es) at revision {}",
            self.matches.len(),
            surface.revision()
        );
    }

    /// Rescan if the document changed since the last scan. Returns whether a
    /// rescan happened.
    pub fn refresh<S>(&mut self, surface: &S) -> bool
    where
        S: EditorSurface + ?Sized,
    {
        if self.is_fresh(surface) {
            return false;
        }
        self.rescan(surface);
        true
    }

    fn is_fresh<S>(&self, surface: &S) -> bool
    where
        S: EditorSurface + ?Sized,
    {
        self.scanned_revision == Some(surface.revision())
    }

    /// Forget matches (find bar closed).
    pub fn clear(&mut self) {
        self.matches.clear();
        self.current_index = 0;
        self.scanned_revision = None;
    }

    pub fn go_to_next(&mut self) -> Option<MatchSpan> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_index = (self.current_index + 1) % self.matches.len();
        self.current().cloned()
    }

    pub fn go_to_previous(&mut self) -> Option<MatchSpan> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_index = self
            .current_index
            .checked_sub(1)
            .unwrap_or(self.matches.len() - 1);
        self.current().cloned()
    }

    /// Select the current match on the surface.
    pub fn select_current<S>(&self, surface: &mut S) -> Option<MatchSpan>
    where
        S: EditorSurface + ?Sized,
    {
        let span = self.current()?.clone();
        surface.set_selection(Selection::span(span.from, span.to));
        Some(span)
    }

    /// Replace the current match and move to the next match after the
    /// replacement. A stale span triggers a rescan instead of an edit.
    /// Returns the number of replacements made (0 or 1).
    pub fn replace_one<S>(&mut self, surface: &mut S) -> Result<usize, EditError>
    where
        S: EditorSurface + ?Sized,
    {
        let Some(span) = self.current().cloned() else {
            return Ok(0);
        };
        if !self.is_fresh(surface) || surface.text_between(span.from, span.to) != span.text {
            debug!("current match is stale, rescanning");
            self.rescan(surface);
            return Ok(0);
        }
        let receipt = surface.apply(Edit::Replace {
            range: span.from..span.to,
            text: self.replace_term.clone(),
        })?;
        self.acknowledge(surface, &receipt);
        Ok(1)
    }

    /// Replace every match, last to first so earlier offsets stay valid, then
    /// rescan once.
    pub fn replace_all<S>(&mut self, surface: &mut S) -> Result<usize, EditError>
    where
        S: EditorSurface + ?Sized,
    {
        if !self.is_fresh(surface) {
            self.rescan(surface);
        }
        if self.matches.is_empty() {
            return Ok(0);
        }
        let mut spans = self.matches.clone();
        spans.sort_by(|a, b| b.from.cmp(&a.from));
        let mut replaced = 0;
        let mut outcome = Ok(());
        for span in &spans {
            match surface.apply(Edit::Replace {
                range: span.from..span.to,
                text: self.replace_term.clone(),
            }) {
                Ok(_) => replaced += 1,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.current_index = 0;
        self.rescan(surface);
        debug!("replaced {} match(es)", replaced);
        outcome.map(|()| replaced)
    }

    /// Rescan after an acknowledged replacement and move the cursor to the
    /// first match starting at or after the replaced text, wrapping to 0.
    fn acknowledge<S>(&mut self, surface: &S, receipt: &EditReceipt)
    where
        S: EditorSurface + ?Sized,
    {
        self.rescan(surface);
        self.current_index = self
            .matches
            .iter()
            .position(|span| span.from >= receipt.range.end)
            .unwrap_or(0);
    }
}
