//! Find next / find previous over a buffer.
//!
//! ## Learning: Explicit State Machines
//!
//! A find request does not only depend on the caret. It also depends on
//! whether the previous request wrapped around the end (or the start) of
//! the buffer, so that turning around right after a wrap crosses the
//! boundary again instead of getting stuck on it. That memory lives in
//! [`SearchState`] as two flags, and every transition is a plain
//! assignment in [`Finder::find_next`] / [`Finder::find_previous`].
//!
//! Each request is at most two passes over the match list: one from the
//! caret, and one wrapped pass from the opposite end of the buffer. The
//! wrapped pass cannot fail when there is at least one match, so a request
//! always terminates.

use serde::{Deserialize, Serialize};
use zephyr_buffer::{Caret, Selection, TextBuffer};

/// Direction of a find request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindDirection {
    /// Towards the end of the buffer
    #[default]
    Next,
    /// Towards the start of the buffer
    Previous,
}

/// Search modifiers chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchModifiers {
    /// Only match occurrences delimited by whitespace or buffer boundaries
    pub whole_word: bool,

    /// Compare case-sensitively
    pub match_case: bool,

    /// Accepted from the UI but not implemented; searches stay literal
    pub regex: bool,
}

impl SearchModifiers {
    /// No modifiers: literal, case-insensitive, substring search.
    pub const NONE: SearchModifiers = SearchModifiers {
        whole_word: false,
        match_case: false,
        regex: false,
    };

    /// Case-sensitive search.
    pub const MATCH_CASE: SearchModifiers = SearchModifiers {
        whole_word: false,
        match_case: true,
        regex: false,
    };

    /// Whole-word, case-insensitive search.
    pub const WHOLE_WORD: SearchModifiers = SearchModifiers {
        whole_word: true,
        match_case: false,
        regex: false,
    };
}

/// Cached results of the last scan plus navigation memory.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Pattern used for the last scan
    pattern: String,

    /// Modifiers used for the last scan
    modifiers: SearchModifiers,

    /// Buffer revision the matches were computed against
    revision: Option<u64>,

    /// Ascending, non-overlapping match offsets
    matches: Vec<usize>,

    /// Index of the current match
    cursor: usize,

    /// The last forward navigation crossed the end of the buffer
    wrapped_forward: bool,

    /// The last backward navigation crossed the start of the buffer
    wrapped_backward: bool,

    /// The most recent request needed its wrapped pass
    wrapped_last_step: bool,
}

impl SearchState {
    /// Pattern of the last scan.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Modifiers of the last scan.
    pub fn modifiers(&self) -> SearchModifiers {
        self.modifiers
    }

    /// Match offsets of the last scan.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Index of the current match in [`SearchState::matches`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Offset of the current match, if any.
    pub fn current_match(&self) -> Option<usize> {
        self.matches.get(self.cursor).copied()
    }

    pub fn wrapped_forward(&self) -> bool {
        self.wrapped_forward
    }

    pub fn wrapped_backward(&self) -> bool {
        self.wrapped_backward
    }

    /// Returns true if the most recent request wrapped around.
    pub fn wrapped_last_step(&self) -> bool {
        self.wrapped_last_step
    }

    /// Returns true if the cached matches cannot be reused for this
    /// request against a buffer at `revision`.
    pub fn is_stale(&self, pattern: &str, modifiers: SearchModifiers, revision: u64) -> bool {
        self.revision != Some(revision) || self.pattern != pattern || self.modifiers != modifiers
    }

    fn pattern_len(&self) -> usize {
        self.pattern.chars().count()
    }

    fn select(&mut self, index: usize) -> Selection {
        self.cursor = index;
        let start = self.matches[index];
        Selection::new(start, start + self.pattern_len())
    }
}

/// The search engine: scans a buffer and walks its matches.
#[derive(Debug, Clone, Default)]
pub struct Finder {
    state: SearchState,
}

impl Finder {
    /// Creates a finder with nothing scanned yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current search state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Recomputes the matches for `pattern` and resets navigation.
    ///
    /// Returns the number of matches found.
    pub fn rescan(&mut self, buffer: &TextBuffer, pattern: &str, modifiers: SearchModifiers) -> usize {
        if modifiers.regex {
            tracing::debug!("Regular expressions are not supported, searching literally");
        }

        let matches = buffer.find(pattern, modifiers.whole_word, modifiers.match_case);
        tracing::debug!(
            pattern,
            revision = buffer.revision(),
            count = matches.len(),
            "Rescanned buffer"
        );

        self.state = SearchState {
            pattern: pattern.to_string(),
            modifiers,
            revision: Some(buffer.revision()),
            matches,
            ..SearchState::default()
        };
        self.state.matches.len()
    }

    /// Advances to the next or previous match relative to `caret`.
    ///
    /// Returns the selection to apply, or `None` when the last scan found
    /// nothing.
    pub fn step(&mut self, direction: FindDirection, caret: &Caret, buffer: &TextBuffer) -> Option<Selection> {
        match direction {
            FindDirection::Next => self.find_next(caret),
            FindDirection::Previous => self.find_previous(caret, buffer),
        }
    }

    /// Selects the first match at or after the caret, wrapping to the
    /// first match of the buffer when there is none.
    ///
    /// A match that ends exactly at the caret still counts as ahead of it,
    /// so the match just selected by the previous request (caret on its
    /// end) is not picked again.
    pub fn find_next(&mut self, caret: &Caret) -> Option<Selection> {
        if self.state.matches.is_empty() {
            return None;
        }

        let mut from = caret.position;
        if self.state.wrapped_backward {
            from = 0;
            self.state.wrapped_backward = false;
            self.state.wrapped_forward = true;
        }
        let mut threshold = from.saturating_sub(self.state.pattern_len().saturating_sub(1));
        self.state.wrapped_last_step = false;

        for wrapping in [false, true] {
            if wrapping {
                tracing::trace!("No match ahead of the caret, wrapping to the start");
                self.state.wrapped_forward = true;
                self.state.wrapped_backward = false;
                self.state.wrapped_last_step = true;
                threshold = 0;
            }

            if let Some(index) = self.state.matches.iter().position(|&m| m >= threshold) {
                if index != 0 {
                    self.state.wrapped_forward = false;
                }
                return Some(self.state.select(index));
            }
        }

        None
    }

    /// Selects the last match before the caret, wrapping to the last match
    /// of the buffer when there is none.
    ///
    /// When the caret sits at the end of a selection that already holds the
    /// pattern, that occurrence is skipped once, so repeated requests walk
    /// backwards instead of re-selecting it.
    pub fn find_previous(&mut self, caret: &Caret, buffer: &TextBuffer) -> Option<Selection> {
        let last = self.state.matches.len().checked_sub(1)?;

        let mut from = caret.position;
        if self.state.wrapped_forward {
            from = buffer.len_chars();
            self.state.wrapped_forward = false;
            self.state.wrapped_backward = true;
        }

        let selection = caret.selection();
        if !selection.is_empty()
            && from == selection.end
            && buffer.matches_at(selection, &self.state.pattern, self.state.modifiers.match_case)
        {
            from = from.saturating_sub(self.state.pattern_len());
        }
        self.state.wrapped_last_step = false;

        for wrapping in [false, true] {
            if wrapping {
                tracing::trace!("No match behind the caret, wrapping to the end");
                self.state.wrapped_backward = true;
                self.state.wrapped_forward = false;
                self.state.wrapped_last_step = true;
                from = buffer.len_chars();
            }

            if let Some(index) = self.state.matches.iter().rposition(|&m| m < from) {
                if index != last {
                    self.state.wrapped_backward = false;
                }
                return Some(self.state.select(index));
            }
        }

        None
    }
}
