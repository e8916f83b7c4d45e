//! The search session: decides when to rescan before stepping.
//!
//! A session owns one [`Finder`] for one document. Every request carries
//! the full query; the session compares it (and the buffer revision) to
//! what the finder last scanned and only rescans when something changed.

use zephyr_buffer::{Caret, Selection, TextBuffer};

use crate::finder::{FindDirection, Finder, SearchModifiers};

/// The query matched nothing in the buffer.
///
/// This is an expected outcome, not a failure of the editor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No matches for \"{pattern}\"")]
pub struct NoMatches {
    pub pattern: String,
}

/// Per-document search controller.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    finder: Finder,

    /// The last scan found nothing
    exhausted: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying finder.
    pub fn finder(&self) -> &Finder {
        &self.finder
    }

    /// Returns true if the last scan found no matches and nothing has
    /// changed since.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Runs one find request.
    ///
    /// Rescans the buffer when the pattern, the modifiers or the buffer
    /// content changed since the last scan, then moves to the next or
    /// previous match relative to `caret`. Changing only the direction
    /// reuses the cached matches.
    pub fn search(
        &mut self,
        buffer: &TextBuffer,
        caret: &Caret,
        pattern: &str,
        direction: FindDirection,
        modifiers: SearchModifiers,
    ) -> Result<Selection, NoMatches> {
        let stale = self.finder.state().is_stale(pattern, modifiers, buffer.revision());

        if stale {
            tracing::debug!(pattern, ?modifiers, "Search query or buffer changed, rescanning");
            let count = self.finder.rescan(buffer, pattern, modifiers);
            self.exhausted = count == 0;
        } else if self.exhausted {
            tracing::debug!(pattern, "Query unchanged since an empty scan, skipping rescan");
        }

        if self.exhausted {
            return Err(self.no_matches(pattern));
        }

        self.finder
            .step(direction, caret, buffer)
            .ok_or_else(|| self.no_matches(pattern))
    }

    /// Returns true if the most recent successful request wrapped around.
    pub fn wrapped(&self) -> bool {
        self.finder.state().wrapped_last_step()
    }

    fn no_matches(&self, pattern: &str) -> NoMatches {
        tracing::debug!(pattern, "No matches");
        NoMatches {
            pattern: pattern.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(
        session: &mut SearchSession,
        buffer: &TextBuffer,
        caret: &mut Caret,
        pattern: &str,
        direction: FindDirection,
    ) -> Result<Selection, NoMatches> {
        let found = session.search(buffer, caret, pattern, direction, SearchModifiers::NONE)?;
        caret.select(found);
        Ok(found)
    }

    #[test]
    fn test_first_search_scans() {
        let buffer = TextBuffer::from("one two one");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);

        let found = search(&mut session, &buffer, &mut caret, "one", FindDirection::Next);
        assert_eq!(found, Ok(Selection::new(0, 3)));
        assert_eq!(session.finder().state().matches(), &[0, 8]);
    }

    #[test]
    fn test_no_matches_is_reported() {
        let buffer = TextBuffer::from("one two one");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);

        let err = search(&mut session, &buffer, &mut caret, "three", FindDirection::Next).unwrap_err();
        assert_eq!(err.pattern, "three");
        assert_eq!(err.to_string(), "No matches for \"three\"");
        assert!(session.is_exhausted());

        // Same query again stays exhausted without a rescan
        assert!(search(&mut session, &buffer, &mut caret, "three", FindDirection::Previous).is_err());
        assert!(session.is_exhausted());
    }

    #[test]
    fn test_empty_pattern_has_no_matches() {
        let buffer = TextBuffer::from("text");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);
        assert!(search(&mut session, &buffer, &mut caret, "", FindDirection::Next).is_err());
    }

    #[test]
    fn test_edit_clears_exhaustion() {
        let mut buffer = TextBuffer::from("one two");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);

        assert!(search(&mut session, &buffer, &mut caret, "three", FindDirection::Next).is_err());

        buffer.insert(7, " three").unwrap();
        let found = search(&mut session, &buffer, &mut caret, "three", FindDirection::Next);
        assert_eq!(found, Ok(Selection::new(8, 13)));
        assert!(!session.is_exhausted());
    }

    #[test]
    fn test_direction_change_keeps_matches() {
        let buffer = TextBuffer::from("ab ab ab");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);

        search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next).unwrap();
        search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next).unwrap();
        assert_eq!(session.finder().state().cursor(), 1);

        // A rescan would reset the cursor to 0 before stepping
        let found = search(&mut session, &buffer, &mut caret, "ab", FindDirection::Previous);
        assert_eq!(found, Ok(Selection::new(0, 2)));
        assert_eq!(session.finder().state().cursor(), 0);

        let found = search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next);
        assert_eq!(found, Ok(Selection::new(3, 5)));
    }

    #[test]
    fn test_pattern_change_rescans() {
        let buffer = TextBuffer::from("ab cd ab");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(0);

        search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next).unwrap();
        let found = search(&mut session, &buffer, &mut caret, "cd", FindDirection::Next);
        assert_eq!(found, Ok(Selection::new(3, 5)));
        assert_eq!(session.finder().state().pattern(), "cd");
    }

    #[test]
    fn test_modifier_change_rescans() {
        let buffer = TextBuffer::from("Ab ab");
        let mut session = SearchSession::new();
        let caret = Caret::new(0);

        session
            .search(&buffer, &caret, "ab", FindDirection::Next, SearchModifiers::NONE)
            .unwrap();
        assert_eq!(session.finder().state().matches(), &[0, 3]);

        session
            .search(&buffer, &caret, "ab", FindDirection::Next, SearchModifiers::MATCH_CASE)
            .unwrap();
        assert_eq!(session.finder().state().matches(), &[3]);
    }

    #[test]
    fn test_single_match_never_fails() {
        let buffer = TextBuffer::from("xx needle yy");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(11);

        for _ in 0..10 {
            let found = search(&mut session, &buffer, &mut caret, "needle", FindDirection::Next);
            assert_eq!(found, Ok(Selection::new(3, 9)));
        }
    }

    #[test]
    fn test_wrapped_reports_last_step() {
        let buffer = TextBuffer::from("ab ab");
        let mut session = SearchSession::new();
        let mut caret = Caret::new(5);

        search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next).unwrap();
        assert!(session.wrapped());
        search(&mut session, &buffer, &mut caret, "ab", FindDirection::Next).unwrap();
        assert!(!session.wrapped());
    }
}
