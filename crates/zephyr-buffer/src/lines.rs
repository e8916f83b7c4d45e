//! Line-structural edits.
//!
//! Every operation here works on whole lines located around a caret or
//! a selection. A line is the text between two `'\n'` (or a buffer
//! boundary); the terminator belongs to neither neighbour.
//!
//! The operations return where the view should put its caret or
//! selection afterwards, but never touch view state themselves.

use crate::{BufferResult, Selection, TextBuffer};

impl TextBuffer {
    /// Opens a blank line above the line containing `offset`.
    ///
    /// Returns the offset of the new blank line. On the first line there is
    /// no terminator before the caret, so the blank line is opened after the
    /// first terminator instead (or at the end of a single-line buffer).
    pub fn create_line_above(&mut self, offset: usize) -> BufferResult<usize> {
        self.check_offset(offset)?;
        let at = self
            .rfind_newline(offset)
            .or_else(|| self.find_newline(0))
            .unwrap_or(self.len_chars());

        self.insert(at, "\n")?;
        Ok(at + 1)
    }

    /// Opens a blank line below the line containing `offset`.
    ///
    /// Returns the offset of the new blank line.
    pub fn create_line_below(&mut self, offset: usize) -> BufferResult<usize> {
        self.check_offset(offset)?;
        let at = self.find_newline(offset).unwrap_or(self.len_chars());

        self.insert(at, "\n")?;
        Ok(at + 1)
    }

    /// Inserts a copy of the lines spanned by `[start, end)` right after them.
    ///
    /// The copy includes the terminator of the last spanned line. When the
    /// span reaches the last line of the buffer, which has no terminator,
    /// the copy is appended directly after it.
    pub fn duplicate_lines(&mut self, start: usize, end: usize) -> BufferResult<()> {
        let (span_start, span_end) = self.line_span(start, end)?;
        let stop = (span_end + 1).min(self.len_chars());

        let copy = self.read(span_start, stop - span_start)?;
        self.insert(stop, &copy)
    }

    /// Joins the lines spanned by `[start, end)`, replacing each terminator
    /// between them with `separator`.
    ///
    /// A span that stays within one line is left untouched.
    pub fn join_lines(&mut self, start: usize, end: usize, separator: &str) -> BufferResult<()> {
        let (span_start, span_end) = self.line_span(start, end)?;
        let span = self.read(span_start, span_end - span_start)?;

        if span.contains('\n') {
            self.replace(span_start, span.chars().count(), &span.replace('\n', separator))?;
        }
        Ok(())
    }

    /// Swaps the line containing `offset` with the line above it.
    ///
    /// Returns the moved line's new range, or an empty selection at
    /// `offset` when it already is the first line.
    pub fn move_line_up(&mut self, offset: usize) -> BufferResult<Selection> {
        let line = self.line_containing(offset)?;
        if line.start == 0 {
            return Ok(Selection::caret(offset));
        }

        let above = self.line_containing(line.start - 1)?;
        let current = self.read(line.start, line.len())?;
        let previous = self.read(above.start, above.len())?;

        self.replace(
            above.start,
            line.end - above.start,
            &format!("{current}\n{previous}"),
        )?;
        Ok(Selection::new(above.start, above.start + line.len()))
    }

    /// Swaps the line containing `offset` with the line below it.
    ///
    /// Returns the moved line's new range, or an empty selection at
    /// `offset` when it already is the last line.
    pub fn move_line_down(&mut self, offset: usize) -> BufferResult<Selection> {
        let line = self.line_containing(offset)?;
        if line.end == self.len_chars() {
            return Ok(Selection::caret(offset));
        }

        let below = self.line_containing(line.end + 1)?;
        let current = self.read(line.start, line.len())?;
        let next = self.read(below.start, below.len())?;

        self.replace(
            line.start,
            below.end - line.start,
            &format!("{next}\n{current}"),
        )?;
        let moved = line.start + below.len() + 1;
        Ok(Selection::new(moved, moved + line.len()))
    }

    /// Returns the line containing `offset`, without its terminator.
    pub fn select_line(&self, offset: usize) -> BufferResult<Selection> {
        Ok(self.line_containing(offset)?.into())
    }

    /// Returns the line containing `offset` with leading and trailing
    /// spaces and tabs left out.
    ///
    /// A line made only of spaces and tabs (or an empty one) yields an
    /// empty selection at `offset`.
    pub fn select_line_text(&self, offset: usize) -> BufferResult<Selection> {
        let line = self.line_containing(offset)?;
        let text = self.read(line.start, line.len())?;
        let is_text = |c: &char| *c != ' ' && *c != '\t';

        let first = text.chars().position(|c| is_text(&c));
        let last = text.chars().rev().position(|c| is_text(&c));

        match (first, last) {
            (Some(first), Some(from_end)) => Ok(Selection::new(
                line.start + first,
                line.end - from_end,
            )),
            _ => Ok(Selection::caret(offset)),
        }
    }

    /// Full-line span shared by duplicate and join.
    ///
    /// Starts at the beginning of the line containing `start`. Ends at `end`
    /// when `end` is the buffer end or sits on a terminator; otherwise at
    /// the next terminator, or at the last char of the buffer when there is
    /// none.
    fn line_span(&self, start: usize, end: usize) -> BufferResult<(usize, usize)> {
        self.check_range(start, end)?;
        let len = self.len_chars();

        let span_start = self.rfind_newline(start).map_or(0, |lf| lf + 1);
        let span_end = if end == len || self.char_at(end) == Some('\n') {
            end
        } else {
            self.find_newline(end).unwrap_or(len - 1)
        };

        Ok((span_start, span_end))
    }
}
