//! Document management.
//!
//! ## Learning: Composition over Inheritance
//!
//! A `Document` is what a text area holds: a `TextBuffer`, the `Caret`
//! drawn on top of it and the `SearchSession` remembering the last find.
//! Each caret-driven method reads the caret, calls the matching buffer
//! operation and then places the caret the way the editor expects.
//!
//! ## Learning: Newtypes
//!
//! `DocumentId` wraps a `Uuid`, so an id can't be confused with any other
//! value and the underlying type stays private.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;
use zephyr_buffer::{BufferError, Caret, Selection, TextBuffer};

use crate::finder::{FindDirection, SearchModifiers};
use crate::session::{NoMatches, SearchSession};
use crate::streamer::{DocumentStreamer, LineEnding};
use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single open file or untitled buffer.
pub struct Document {
    /// Unique identifier
    id: DocumentId,

    /// The underlying text buffer
    buffer: TextBuffer,

    /// Caret and selection
    caret: Caret,

    /// Find state for this document
    search: SearchSession,
}

impl Document {
    /// Creates a new empty, untitled document.
    pub fn new() -> Self {
        Self::from_buffer(TextBuffer::new())
    }

    /// Wraps an existing buffer, caret at the start.
    pub fn from_buffer(buffer: TextBuffer) -> Self {
        Self {
            id: DocumentId::new(),
            buffer,
            caret: Caret::default(),
            search: SearchSession::new(),
        }
    }

    /// Opens a document from a file.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Ok(Self::from_buffer(DocumentStreamer::read(path)?))
    }

    // ==================== Getters ====================

    /// Returns the document ID.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.buffer.path()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        self.buffer.name()
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the text buffer for direct edits.
    ///
    /// The caret is pulled back inside the buffer on the next
    /// caret-driven call.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Returns the caret.
    pub fn caret(&self) -> &Caret {
        &self.caret
    }

    /// Returns the search session.
    pub fn search_session(&self) -> &SearchSession {
        &self.search
    }

    /// Returns all text.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.text()
    }

    /// Returns the selected text, empty without a selection.
    pub fn selected_text(&self) -> CoreResult<String> {
        Ok(self.caret.selected_text(&self.buffer)?)
    }

    // ==================== Caret ====================

    /// Moves the caret, dropping the selection.
    pub fn move_caret_to(&mut self, offset: usize) -> CoreResult<()> {
        self.check_offset(offset)?;
        self.caret.move_to(offset);
        Ok(())
    }

    /// Selects a range; the caret lands on its end.
    pub fn select(&mut self, selection: Selection) -> CoreResult<()> {
        self.check_offset(selection.end)?;
        self.caret.select(selection);
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.caret.clear_selection();
    }

    fn check_offset(&self, offset: usize) -> CoreResult<()> {
        let len = self.buffer.len_chars();
        if offset > len {
            return Err(BufferError::InvalidOffset { offset, len }.into());
        }
        Ok(())
    }

    /// Caret after an edit made outside the caret-driven methods.
    fn current_caret(&mut self) -> Caret {
        self.caret.clamp(self.buffer.len_chars());
        self.caret
    }

    // ==================== Line Editing ====================

    /// Opens a blank line above the caret's line and moves there.
    pub fn create_line_above(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let offset = self.buffer.create_line_above(caret.position)?;
        self.caret.move_to(offset);
        Ok(())
    }

    /// Opens a blank line below the caret's line and moves there.
    pub fn create_line_below(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let offset = self.buffer.create_line_below(caret.position)?;
        self.caret.move_to(offset);
        Ok(())
    }

    /// Duplicates the lines touched by the selection.
    pub fn duplicate_lines(&mut self) -> CoreResult<()> {
        let selection = self.current_caret().selection();
        self.buffer.duplicate_lines(selection.start, selection.end)?;
        Ok(())
    }

    /// Joins the lines touched by the selection with `separator`.
    pub fn join_lines(&mut self, separator: &str) -> CoreResult<()> {
        let selection = self.current_caret().selection();
        self.buffer.join_lines(selection.start, selection.end, separator)?;
        self.caret.clamp(self.buffer.len_chars());
        Ok(())
    }

    /// Moves the caret's line up and selects it.
    pub fn move_line_up(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let moved = self.buffer.move_line_up(caret.position)?;
        if !moved.is_empty() {
            self.caret.select(moved);
        }
        Ok(())
    }

    /// Moves the caret's line down and selects it.
    pub fn move_line_down(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let moved = self.buffer.move_line_down(caret.position)?;
        if !moved.is_empty() {
            self.caret.select(moved);
        }
        Ok(())
    }

    /// Selects the caret's line.
    pub fn select_line(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let line = self.buffer.select_line(caret.position)?;
        self.caret.select(line);
        Ok(())
    }

    /// Selects the caret's line without surrounding blanks.
    pub fn select_line_text(&mut self) -> CoreResult<()> {
        let caret = self.current_caret();
        let text = self.buffer.select_line_text(caret.position)?;
        self.caret.select(text);
        Ok(())
    }

    /// Upper-cases the selection.
    pub fn to_upper_case(&mut self) -> CoreResult<()> {
        let selection = self.current_caret().selection();
        self.buffer.to_upper_case(selection.start, selection.end)?;
        Ok(())
    }

    /// Lower-cases the selection.
    pub fn to_lower_case(&mut self) -> CoreResult<()> {
        let selection = self.current_caret().selection();
        self.buffer.to_lower_case(selection.start, selection.end)?;
        Ok(())
    }

    // ==================== Search ====================

    /// Finds the next or previous occurrence of `pattern` and selects it.
    pub fn find(
        &mut self,
        pattern: &str,
        direction: FindDirection,
        modifiers: SearchModifiers,
    ) -> Result<Selection, NoMatches> {
        let caret = self.current_caret();
        let found = self
            .search
            .search(&self.buffer, &caret, pattern, direction, modifiers)?;
        self.caret.select(found);
        Ok(found)
    }

    /// Returns true if the last find wrapped around.
    pub fn search_wrapped(&self) -> bool {
        self.search.wrapped()
    }

    // ==================== File Operations ====================

    /// Saves the document to its own path.
    pub fn save(&mut self, line_ending: LineEnding) -> CoreResult<()> {
        DocumentStreamer::write(&mut self.buffer, line_ending)
    }

    /// Saves the document to a new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>, line_ending: LineEnding) -> CoreResult<()> {
        DocumentStreamer::write_as(&mut self.buffer, path, line_ending)
    }

    /// Deletes the backing file, if any.
    pub fn delete_file(&self) -> CoreResult<bool> {
        DocumentStreamer::delete(&self.buffer)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Manages the open documents (the editor's tabs).
pub struct DocumentManager {
    /// All open documents
    documents: HashMap<DocumentId, Document>,

    /// Order of documents (for tabs)
    order: Vec<DocumentId>,

    /// Currently active document
    active: Option<DocumentId>,
}

impl DocumentManager {
    /// Creates a new document manager.
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
            active: None,
        }
    }

    /// Adds a document and makes it active.
    pub fn add(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        self.documents.insert(id, doc);
        self.order.push(id);
        self.active = Some(id);
        id
    }

    /// Closes a document, activating the last remaining one.
    pub fn close(&mut self, id: DocumentId) -> CoreResult<Document> {
        let doc = self.documents.remove(&id).ok_or(CoreError::DocumentNotFound(id))?;
        self.order.retain(|&i| i != id);

        if self.active == Some(id) {
            self.active = self.order.last().copied();
        }

        Ok(doc)
    }

    /// Returns a document by ID.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns a mutable document by ID.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Returns the active document's ID.
    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    /// Returns the active document.
    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|id| self.documents.get(&id))
    }

    /// Returns a mutable reference to the active document.
    pub fn active_mut(&mut self) -> Option<&mut Document> {
        self.active.and_then(|id| self.documents.get_mut(&id))
    }

    /// Sets the active document.
    pub fn set_active(&mut self, id: DocumentId) -> CoreResult<()> {
        if !self.documents.contains_key(&id) {
            return Err(CoreError::DocumentNotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Finds a document by path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.documents.get(id).and_then(Document::path) == Some(path))
    }

    /// Returns the documents in tab order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    /// Returns the document order (for tabs).
    pub fn order(&self) -> &[DocumentId] {
        &self.order
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_buffer(TextBuffer::from(text))
    }

    #[test]
    fn test_create_lines_move_caret() {
        let mut d = doc("one\ntwo");
        d.move_caret_to(5).unwrap();

        d.create_line_below().unwrap();
        assert_eq!(d.text(), "one\ntwo\n");
        assert_eq!(d.caret().position, 8);

        d.move_caret_to(5).unwrap();
        d.create_line_above().unwrap();
        assert_eq!(d.text(), "one\n\ntwo\n");
        assert_eq!(d.caret().position, 4);
    }

    #[test]
    fn test_duplicate_keeps_selection() {
        let mut d = doc("a\nb\nc");
        d.select(Selection::new(0, 3)).unwrap();
        d.duplicate_lines().unwrap();

        assert_eq!(d.text(), "a\nb\na\nb\nc");
        assert_eq!(d.caret().selection(), Selection::new(0, 3));
    }

    #[test]
    fn test_join_lines_on_selection() {
        let mut d = doc("a\nb\nc");
        d.select(Selection::new(0, 3)).unwrap();
        d.join_lines(", ").unwrap();
        assert_eq!(d.text(), "a, b\nc");
    }

    #[test]
    fn test_move_line_selects_moved_line() {
        let mut d = doc("first\nsecond");
        d.move_caret_to(8).unwrap();

        d.move_line_up().unwrap();
        assert_eq!(d.text(), "second\nfirst");
        assert_eq!(d.caret().selection(), Selection::new(0, 6));

        d.move_line_up().unwrap();
        assert_eq!(d.text(), "second\nfirst");
        assert_eq!(d.caret().selection(), Selection::new(0, 6));

        d.move_line_down().unwrap();
        assert_eq!(d.text(), "first\nsecond");
        assert_eq!(d.caret().selection(), Selection::new(6, 12));
    }

    #[test]
    fn test_select_line_and_text() {
        let mut d = doc("x\n  indented  \ny");
        d.move_caret_to(4).unwrap();

        d.select_line().unwrap();
        assert_eq!(d.selected_text().unwrap(), "  indented  ");

        d.move_caret_to(4).unwrap();
        d.select_line_text().unwrap();
        assert_eq!(d.selected_text().unwrap(), "indented");
    }

    #[test]
    fn test_case_conversion_keeps_selection() {
        let mut d = doc("make me loud");
        d.select(Selection::new(5, 7)).unwrap();

        d.to_upper_case().unwrap();
        assert_eq!(d.text(), "make ME loud");
        assert_eq!(d.caret().selection(), Selection::new(5, 7));

        d.to_lower_case().unwrap();
        assert_eq!(d.text(), "make me loud");
    }

    #[test]
    fn test_find_selects_match() {
        let mut d = doc("alpha beta alpha");

        let found = d.find("alpha", FindDirection::Next, SearchModifiers::NONE);
        assert_eq!(found, Ok(Selection::new(0, 5)));
        let found = d.find("alpha", FindDirection::Next, SearchModifiers::NONE);
        assert_eq!(found, Ok(Selection::new(11, 16)));
        assert_eq!(d.selected_text().unwrap(), "alpha");

        let err = d.find("gamma", FindDirection::Next, SearchModifiers::NONE);
        assert!(err.is_err());
        // A failed find leaves the selection alone
        assert_eq!(d.caret().selection(), Selection::new(11, 16));
    }

    #[test]
    fn test_caret_bounds() {
        let mut d = doc("abc");
        assert!(matches!(
            d.move_caret_to(4),
            Err(CoreError::Buffer(BufferError::InvalidOffset { offset: 4, len: 3 }))
        ));
        assert!(d.select(Selection::new(1, 9)).is_err());
    }

    #[test]
    fn test_caret_follows_direct_edits() {
        let mut d = doc("one two");
        d.move_caret_to(7).unwrap();
        d.buffer_mut().delete(3, 4).unwrap();

        d.create_line_below().unwrap();
        assert_eq!(d.text(), "one\n");
        assert_eq!(d.caret().position, 4);
    }

    #[test]
    fn test_find_after_buffer_replaced_rescans() {
        let mut d = doc("ab ab ab");
        assert_eq!(
            d.find("ab", FindDirection::Next, SearchModifiers::NONE),
            Ok(Selection::new(0, 2))
        );

        *d.buffer_mut() = TextBuffer::from("xy");
        assert_eq!(
            d.find("ab", FindDirection::Next, SearchModifiers::NONE),
            Err(NoMatches { pattern: "ab".into() })
        );
        assert!(d.caret().position <= d.buffer().len_chars());

        *d.buffer_mut() = TextBuffer::from("zzzab");
        assert_eq!(
            d.find("ab", FindDirection::Next, SearchModifiers::NONE),
            Ok(Selection::new(3, 5))
        );
    }

    #[test]
    fn test_manager_close_activates_last() {
        let mut manager = DocumentManager::new();
        let a = manager.add(Document::new());
        let b = manager.add(Document::new());
        let c = manager.add(Document::new());

        manager.set_active(b).unwrap();
        manager.close(b).unwrap();
        assert_eq!(manager.active_id(), Some(c));
        assert_eq!(manager.order(), &[a, c]);

        manager.close(c).unwrap();
        manager.close(a).unwrap();
        assert!(manager.is_empty());
        assert_eq!(manager.active_id(), None);
        assert!(matches!(manager.close(a), Err(CoreError::DocumentNotFound(_))));
    }
}
