//! Caret and position types for text navigation.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` is a struct that wraps line/column coordinates.
//! This is better than using `(usize, usize)` because:
//! - Type safety: Can't accidentally swap line and column
//! - Named fields: Self-documenting code

use serde::{Deserialize, Serialize};

use crate::{BufferResult, Selection, TextBuffer};

/// A position in the text buffer (line and column).
///
/// Both line and column are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in chars not bytes)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display as 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The caret of a text view: an offset plus an optional selection anchor.
///
/// When `anchor` is `Some`, the text between the anchor and the caret is
/// selected. Selecting a range places the anchor on its start and the
/// caret on its end, which is where a follow-up "find next" resumes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Caret {
    /// Current caret offset
    pub position: usize,

    /// Selection anchor (if selecting text)
    pub anchor: Option<usize>,
}

impl Caret {
    /// Creates a caret at an offset with no selection.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            anchor: None,
        }
    }

    /// Returns true if there's an active (non-empty) selection.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.position)
    }

    /// Returns the selection, or an empty selection at the caret.
    pub fn selection(&self) -> Selection {
        match self.anchor {
            Some(anchor) => Selection::new(anchor, self.position),
            None => Selection::caret(self.position),
        }
    }

    /// Moves the caret and drops any selection.
    pub fn move_to(&mut self, offset: usize) {
        self.position = offset;
        self.anchor = None;
    }

    /// Selects a range: anchor on its start, caret on its end.
    pub fn select(&mut self, selection: Selection) {
        self.anchor = Some(selection.start);
        self.position = selection.end;
    }

    /// Clears the selection, keeping the caret where it is.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Returns the selected text, empty when nothing is selected.
    pub fn selected_text(&self, buffer: &TextBuffer) -> BufferResult<String> {
        let selection = self.selection();
        buffer.read(selection.start, selection.len())
    }

    /// Pulls the caret and anchor back inside a buffer of `len` chars.
    pub fn clamp(&mut self, len: usize) {
        self.position = self.position.min(len);
        self.anchor = self.anchor.map(|a| a.min(len));
    }
}
