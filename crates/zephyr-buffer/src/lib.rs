//! # Zephyr Buffer
//!
//! The editable text behind one open document.
//!
//! ## Key Concepts
//!
//! ### Offsets
//! - Every offset is a char index (Unicode scalar value), never a byte index
//! - Valid offsets satisfy `0 <= offset <= len_chars()`
//! - Out-of-range offsets are reported as [`BufferError`], never clamped
//!
//! ### Lines
//! - The only line terminator inside a buffer is `'\n'`
//! - Translation to `\r\n` or `\r` happens at the file boundary, not here
//!
//! ### Ownership & Borrowing
//! - `TextBuffer` owns the rope and the document metadata
//! - Reads borrow (`&self`), every mutation needs `&mut self`, so a buffer
//!   is driven by exactly one editing surface at a time

mod buffer;
mod cursor;
mod lines;
mod search;
mod selection;

pub use buffer::{TextBuffer, UNTITLED};
pub use cursor::{Caret, Position};
pub use search::is_word_separator;
pub use selection::Selection;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations.
///
/// These are contract violations by the caller. They are returned as soon
/// as they are detected and the buffer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Offset {offset} is outside the buffer (length {len})")]
    InvalidOffset { offset: usize, len: usize },

    #[error("Range {start}..{end} is outside the buffer (length {len})")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
        assert_eq!(buffer.name(), UNTITLED);
        assert!(buffer.is_freshly_created());
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_chars(), 13);
        assert_eq!(buffer.text(), "Hello, World!");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        assert_eq!(buffer.text(), "Hello");

        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        buffer.delete(5, 2).unwrap();
        assert_eq!(buffer.text(), "HelloWorld!");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(0).unwrap(), "Line 1\n");
        assert_eq!(buffer.line(1).unwrap(), "Line 2\n");
        assert_eq!(buffer.line(2).unwrap(), "Line 3");
    }

    #[test]
    fn test_errors_display_offsets() {
        let err = BufferError::InvalidRange {
            start: 2,
            end: 9,
            len: 4,
        };
        assert_eq!(err.to_string(), "Range 2..9 is outside the buffer (length 4)");
    }
}
