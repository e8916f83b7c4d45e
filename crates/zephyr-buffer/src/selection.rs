//! Text selection handling.
//!
//! ## Learning: Range Types
//!
//! Selections are half-open `[start, end)` char ranges, like Rust's
//! `Range<usize>`:
//! - Empty selections (start == end) are natural
//! - Easier arithmetic (length = end - start)
//! - Consistent with slice semantics

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A selected span of the buffer, in char offsets.
///
/// The start is always before or equal to the end (normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Selection {
    /// Creates a new selection.
    ///
    /// Automatically normalizes so start <= end.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a zero-width selection (caret position).
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns true if this is a zero-width selection.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the number of selected chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if an offset is within this selection.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the selection as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalization() {
        let sel = Selection::new(10, 5);
        assert_eq!(sel.start, 5);
        assert_eq!(sel.end, 10);
        assert_eq!(sel.len(), 5);
    }

    #[test]
    fn test_caret_selection() {
        let sel = Selection::caret(3);
        assert!(sel.is_empty());
        assert!(!sel.contains(3));
    }

    #[test]
    fn test_from_range() {
        let sel = Selection::from(2..7);
        assert_eq!(sel.range(), 2..7);
        assert!(sel.contains(6));
        assert_eq!(sel.to_string(), "[2, 7)");
    }
}
