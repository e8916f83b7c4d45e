//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! Editing in the middle of a large file with a flat `String` costs O(n)
//! per keystroke. A rope keeps insertions and deletions at O(log n) and
//! makes char-index conversions cheap, which matters because every offset
//! in this crate is a char index.
//!
//! ## Document State
//!
//! Besides the text, a buffer tracks what the host needs to decide whether
//! a tab must be saved:
//! - `dirty`: content changed since the last save acknowledgment
//! - `persisted`: the buffer has been associated with a file at least once
//! - `freshly_created`: a blank "new document" nobody has touched yet
//! - `revision`: drawn from a process-wide counter at construction and on
//!   every mutation, so caches (search results) can tell whether they are
//!   still valid without subscribing to changes. No two distinct buffer
//!   states share a revision, even across buffers.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::search::{to_lower, to_upper};
use crate::{BufferError, BufferResult, Position};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Display name given to buffers that have no backing file.
pub const UNTITLED: &str = "Untitled";

/// A text buffer backed by a rope data structure.
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but not `Sync` in spirit: it is mutated in place
/// and the host must serialize every call on it.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Display name (file name, or "Untitled")
    name: String,

    /// Associated file path (if any)
    path: Option<PathBuf>,

    /// Whether the buffer has unsaved changes
    dirty: bool,

    /// Whether the buffer has ever been associated with a file on disk
    persisted: bool,

    /// Whether this is a blank, untouched new document
    freshly_created: bool,

    /// Content version, unique across all buffers
    revision: u64,
}

impl TextBuffer {
    /// Creates a new empty, untitled buffer.
    ///
    /// # Example
    /// ```
    /// use zephyr_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// assert!(buffer.is_freshly_created());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            name: UNTITLED.to_string(),
            path: None,
            dirty: false,
            persisted: false,
            freshly_created: true,
            revision: next_revision(),
        }
    }

    /// Creates a buffer for a document read from storage.
    ///
    /// The content is expected to be normalized to `'\n'` terminators
    /// already; the file boundary takes care of that.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            name: name.into(),
            path: Some(path.into()),
            dirty: false,
            persisted: true,
            freshly_created: false,
            revision: next_revision(),
        }
    }

    // ==================== Document State ====================

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the buffer (the backing path is left alone).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the associated file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns true if the buffer has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true once the buffer has been written to or read from disk.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Returns true for a blank new document that was never edited or saved.
    pub fn is_freshly_created(&self) -> bool {
        self.freshly_created
    }

    /// Returns the content version.
    ///
    /// A new value is drawn on construction and on every mutation, so two
    /// equal revisions always mean equal content, even across buffers.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Acknowledges that the content was flushed to `path`.
    pub fn mark_saved(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
        self.dirty = false;
        self.persisted = true;
        self.freshly_created = false;
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a specific line (0-indexed), including its trailing `'\n'`.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns `len` chars starting at `offset`.
    pub fn read(&self, offset: usize, len: usize) -> BufferResult<String> {
        let end = self.check_span(offset, len)?;
        Ok(self.rope.slice(offset..end).into())
    }

    /// Iterates over every char of the content.
    pub(crate) fn chars(&self) -> ropey::iter::Chars<'_> {
        self.rope.chars()
    }

    /// Returns the char at `offset`, or `None` at or past the end.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of chars in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    // ==================== Mutations ====================

    /// Inserts text at a char offset.
    pub fn insert(&mut self, offset: usize, text: &str) -> BufferResult<()> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(());
        }

        self.rope.insert(offset, text);
        self.touch();
        Ok(())
    }

    /// Deletes `len` chars starting at `offset`, returning the removed text.
    pub fn delete(&mut self, offset: usize, len: usize) -> BufferResult<String> {
        let end = self.check_span(offset, len)?;
        let deleted: String = self.rope.slice(offset..end).into();
        if len > 0 {
            self.rope.remove(offset..end);
            self.touch();
        }
        Ok(deleted)
    }

    /// Replaces `len` chars at `offset` with `text` as a single mutation.
    pub fn replace(&mut self, offset: usize, len: usize, text: &str) -> BufferResult<String> {
        let end = self.check_span(offset, len)?;
        let deleted: String = self.rope.slice(offset..end).into();
        if deleted == text {
            return Ok(deleted);
        }

        self.rope.remove(offset..end);
        self.rope.insert(offset, text);
        self.touch();
        Ok(deleted)
    }

    /// Upper-cases `[start, end)` in place, char by char.
    pub fn to_upper_case(&mut self, start: usize, end: usize) -> BufferResult<()> {
        self.convert_case(start, end, to_upper)
    }

    /// Lower-cases `[start, end)` in place, char by char.
    pub fn to_lower_case(&mut self, start: usize, end: usize) -> BufferResult<()> {
        self.convert_case(start, end, to_lower)
    }

    fn convert_case(&mut self, start: usize, end: usize, fold: fn(char) -> char) -> BufferResult<()> {
        self.check_range(start, end)?;
        let converted: String = self.rope.slice(start..end).chars().map(fold).collect();
        self.replace(start, end - start, &converted)?;
        Ok(())
    }

    // ==================== Lines ====================

    /// Returns `[lineStart, lineEnd)` of the line containing `offset`.
    ///
    /// `lineStart` is the char after the nearest `'\n'` before `offset`
    /// (or 0), `lineEnd` the nearest `'\n'` at or after `offset` (or the
    /// buffer length). The terminator itself is not part of the range.
    pub fn line_containing(&self, offset: usize) -> BufferResult<Range<usize>> {
        self.check_offset(offset)?;
        let start = self.rfind_newline(offset).map_or(0, |lf| lf + 1);
        let end = self.find_newline(offset).unwrap_or(self.len_chars());
        Ok(start..end)
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a char offset.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        let line_start = self.rope.line_to_char(pos.line);
        let line_len = self.rope.line(pos.line).len_chars();

        // Allow column to be at end of line (for insertion)
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(line_start + pos.column)
    }

    /// Converts a char offset to a Position (line, column).
    pub fn char_idx_to_position(&self, offset: usize) -> BufferResult<Position> {
        self.check_offset(offset)?;

        let line = self.rope.char_to_line(offset);
        let column = offset - self.rope.line_to_char(line);

        Ok(Position { line, column })
    }

    // ==================== Internals ====================

    /// Records a mutation.
    fn touch(&mut self) {
        self.dirty = true;
        self.freshly_created = false;
        self.revision = next_revision();
    }

    pub(crate) fn check_offset(&self, offset: usize) -> BufferResult<()> {
        let len = self.len_chars();
        if offset > len {
            return Err(BufferError::InvalidOffset { offset, len });
        }
        Ok(())
    }

    pub(crate) fn check_range(&self, start: usize, end: usize) -> BufferResult<()> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(BufferError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// Validates `len` chars at `offset` and returns the exclusive end.
    fn check_span(&self, offset: usize, len: usize) -> BufferResult<usize> {
        let buffer_len = self.len_chars();
        match offset.checked_add(len) {
            Some(end) if end <= buffer_len => Ok(end),
            _ => Err(BufferError::InvalidRange {
                start: offset,
                end: offset.saturating_add(len),
                len: buffer_len,
            }),
        }
    }

    /// Index of the last `'\n'` strictly before `before`.
    pub(crate) fn rfind_newline(&self, before: usize) -> Option<usize> {
        let mut chars = self.rope.chars_at(before);
        let mut idx = before;
        while let Some(c) = chars.prev() {
            idx -= 1;
            if c == '\n' {
                return Some(idx);
            }
        }
        None
    }

    /// Index of the first `'\n'` at or after `from`.
    pub(crate) fn find_newline(&self, from: usize) -> Option<usize> {
        self.rope
            .chars_at(from)
            .position(|c| c == '\n')
            .map(|i| from + i)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            name: UNTITLED.to_string(),
            path: None,
            dirty: false,
            persisted: false,
            freshly_created: false,
            revision: next_revision(),
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_opened_buffer_state() {
        let buffer = TextBuffer::open("notes.txt", "/tmp/notes.txt", "a\nb");
        assert_eq!(buffer.name(), "notes.txt");
        assert_eq!(buffer.path(), Some(Path::new("/tmp/notes.txt")));
        assert!(buffer.is_persisted());
        assert!(!buffer.is_dirty());
        assert!(!buffer.is_freshly_created());
    }

    #[test]
    fn test_detached_buffer_is_not_persisted() {
        let buffer = TextBuffer::from("content");
        assert!(buffer.path().is_none());
        assert!(!buffer.is_persisted());
        assert!(!buffer.is_freshly_created());
    }

    #[test]
    fn test_mutation_marks_dirty_and_clears_fresh() {
        let mut buffer = TextBuffer::new();
        assert!(!buffer.is_dirty());
        let before = buffer.revision();

        buffer.insert(0, "x").unwrap();
        assert!(buffer.is_dirty());
        assert!(!buffer.is_freshly_created());
        assert_ne!(buffer.revision(), before);
    }

    #[test]
    fn test_mark_saved() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "text").unwrap();
        buffer.mark_saved("/tmp/out.txt");

        assert!(!buffer.is_dirty());
        assert!(buffer.is_persisted());
        assert_eq!(buffer.path(), Some(Path::new("/tmp/out.txt")));

        buffer.insert(4, "!").unwrap();
        assert!(buffer.is_dirty());
        assert!(buffer.is_persisted());
    }

    #[test]
    fn test_empty_edits_do_not_mutate() {
        let mut buffer = TextBuffer::from("abc");
        let before = buffer.revision();
        buffer.insert(1, "").unwrap();
        buffer.delete(1, 0).unwrap();
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.revision(), before);
    }

    #[test]
    fn test_revisions_differ_across_buffers() {
        let first = TextBuffer::from("ab ab ab");
        let second = TextBuffer::from("xy");
        let third = TextBuffer::new();
        assert_ne!(first.revision(), second.revision());
        assert_ne!(second.revision(), third.revision());
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut buffer = TextBuffer::from("abc");
        assert_eq!(
            buffer.insert(4, "x"),
            Err(BufferError::InvalidOffset { offset: 4, len: 3 })
        );
        assert_eq!(buffer.text(), "abc");
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_delete_and_read_out_of_bounds() {
        let mut buffer = TextBuffer::from("abc");
        assert!(matches!(
            buffer.delete(2, 2),
            Err(BufferError::InvalidRange { start: 2, end: 4, len: 3 })
        ));
        assert!(matches!(
            buffer.read(usize::MAX, 1),
            Err(BufferError::InvalidRange { .. })
        ));
        assert_eq!(buffer.read(1, 2).unwrap(), "bc");
    }

    #[test]
    fn test_delete_returns_removed_text() {
        let mut buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.delete(5, 7).unwrap(), ", World");
        assert_eq!(buffer.text(), "Hello!");
    }

    #[test]
    fn test_offsets_are_chars_not_bytes() {
        let mut buffer = TextBuffer::from("héllo");
        buffer.insert(2, "X").unwrap();
        assert_eq!(buffer.text(), "héXllo");
        assert_eq!(buffer.read(1, 2).unwrap(), "éX");
    }

    #[test]
    fn test_line_containing() {
        let buffer = TextBuffer::from("ab\ncd\n\nef");
        assert_eq!(buffer.line_containing(0).unwrap(), 0..2);
        assert_eq!(buffer.line_containing(2).unwrap(), 0..2);
        assert_eq!(buffer.line_containing(3).unwrap(), 3..5);
        assert_eq!(buffer.line_containing(6).unwrap(), 6..6);
        assert_eq!(buffer.line_containing(9).unwrap(), 7..9);
        assert!(buffer.line_containing(10).is_err());
    }

    #[test]
    fn test_case_conversion_preserves_length() {
        let mut buffer = TextBuffer::from("straße Mixed");
        buffer.to_upper_case(0, 12).unwrap();
        // 'ß' upper-cases to two chars, so it is left alone
        assert_eq!(buffer.text(), "STRAßE MIXED");
        assert_eq!(buffer.len_chars(), 12);

        buffer.to_lower_case(7, 12).unwrap();
        assert_eq!(buffer.text(), "STRAßE mixed");
    }

    #[test]
    fn test_case_conversion_noop_keeps_clean() {
        let mut buffer = TextBuffer::from("ABC");
        buffer.to_upper_case(0, 3).unwrap();
        assert!(!buffer.is_dirty());
        assert!(buffer.to_lower_case(2, 1).is_err());
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("ab\ncd");
        assert_eq!(buffer.char_idx_to_position(4).unwrap(), Position::new(1, 1));
        assert_eq!(buffer.position_to_char_idx(Position::new(1, 1)).unwrap(), 4);
        assert!(buffer.position_to_char_idx(Position::new(2, 0)).is_err());
    }

    #[test]
    fn test_carriage_return_is_not_a_line_break() {
        let buffer = TextBuffer::from("a\rb\nc");
        assert_eq!(buffer.len_lines(), 2);
    }

    proptest! {
        #[test]
        fn insert_then_delete_restores_content(
            base in "[a-z \\n]{0,40}",
            insert in "[a-zé\\n]{1,10}",
            at in 0usize..=40,
            dirty_before in any::<bool>(),
        ) {
            let mut buffer = TextBuffer::from(base.as_str());
            if dirty_before {
                buffer.insert(0, "-").unwrap();
                buffer.delete(0, 1).unwrap();
            }
            let original = buffer.text().into_owned();
            let offset = at.min(buffer.len_chars());

            buffer.insert(offset, &insert).unwrap();
            buffer.delete(offset, insert.chars().count()).unwrap();

            prop_assert_eq!(buffer.text(), original);
            prop_assert!(buffer.is_dirty());
        }
    }
}
