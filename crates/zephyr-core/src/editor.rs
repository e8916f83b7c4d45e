//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual components.

use std::path::Path;

use zephyr_buffer::Selection;

use crate::command::Command;
use crate::config::Config;
use crate::document::{Document, DocumentId, DocumentManager};
use crate::event::{EditorEvent, EventBus};
use crate::finder::{FindDirection, SearchModifiers};
use crate::keymap::{KeyPress, Keymap};
use crate::streamer::LineEnding;
use crate::{CoreError, CoreResult};

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by a single thread (the UI thread). Other threads
/// only observe it through the event bus.
pub struct Editor {
    /// Document management
    documents: DocumentManager,

    /// Editor configuration
    config: Config,

    /// Key bindings
    keymap: Keymap,

    /// Event bus for notifications
    event_bus: EventBus,

    /// Whether the editor should quit
    should_quit: bool,
}

impl Editor {
    /// Creates a new editor instance.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let keymap = Keymap::from_config(&config);
        Self {
            documents: DocumentManager::new(),
            config,
            keymap,
            event_bus: EventBus::new(),
            should_quit: false,
        }
    }

    // ==================== Document Operations ====================

    /// Opens a file in a new document.
    ///
    /// A file that is already open is focused instead of read again.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        let path = path.as_ref();

        if let Some(id) = self.documents.find_by_path(path) {
            self.documents.set_active(id)?;
            self.emit(EditorEvent::DocumentFocused(id));
            return Ok(id);
        }

        let doc = Document::open(path)?;
        let id = self.documents.add(doc);

        self.emit(EditorEvent::DocumentOpened(id));
        self.emit(EditorEvent::DocumentFocused(id));

        Ok(id)
    }

    /// Creates a new untitled document.
    pub fn new_document(&mut self) -> DocumentId {
        let id = self.documents.add(Document::new());

        self.emit(EditorEvent::DocumentOpened(id));
        self.emit(EditorEvent::DocumentFocused(id));

        id
    }

    /// Closes a document.
    pub fn close_document(&mut self, id: DocumentId) -> CoreResult<()> {
        let doc = self.documents.close(id)?;
        if doc.is_dirty() {
            tracing::debug!(name = doc.name(), "Closed document with unsaved changes");
        }
        self.emit(EditorEvent::DocumentClosed(id));

        if let Some(active) = self.documents.active_id() {
            self.emit(EditorEvent::DocumentFocused(active));
        }
        Ok(())
    }

    /// Closes the active document.
    pub fn close_current(&mut self) -> CoreResult<()> {
        let id = self.documents.active_id().ok_or(CoreError::NoActiveDocument)?;
        self.close_document(id)
    }

    /// Closes every document.
    pub fn close_all(&mut self) -> CoreResult<()> {
        for id in self.documents.order().to_vec() {
            self.close_document(id)?;
        }
        Ok(())
    }

    /// Sets the active document.
    pub fn focus(&mut self, id: DocumentId) -> CoreResult<()> {
        self.documents.set_active(id)?;
        self.emit(EditorEvent::DocumentFocused(id));
        Ok(())
    }

    /// Saves the current document.
    pub fn save_current(&mut self) -> CoreResult<()> {
        let line_ending = self.config.files.line_ending;
        let doc = self.active_document_mut()?;
        doc.save(line_ending)?;
        let saved = Self::saved_event(doc);
        self.emit(saved);
        Ok(())
    }

    /// Saves the current document to a new path.
    pub fn save_current_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let line_ending = self.config.files.line_ending;
        let doc = self.active_document_mut()?;
        doc.save_as(path, line_ending)?;
        let saved = Self::saved_event(doc);
        self.emit(saved);
        Ok(())
    }

    /// Saves every document that has a file.
    ///
    /// Untitled documents are skipped. Returns how many were written.
    pub fn save_all(&mut self) -> CoreResult<usize> {
        let line_ending = self.config.files.line_ending;
        let mut saved = Vec::new();

        for id in self.documents.order().to_vec() {
            let doc = self.documents.get_mut(id).ok_or(CoreError::DocumentNotFound(id))?;
            if doc.path().is_none() {
                tracing::debug!(name = doc.name(), "Skipping untitled document");
                continue;
            }
            doc.save(line_ending)?;
            saved.push(Self::saved_event(doc));
        }

        let count = saved.len();
        for event in saved {
            self.emit(event);
        }
        Ok(count)
    }

    fn saved_event(doc: &Document) -> EditorEvent {
        let path = doc.path().map(Path::to_path_buf).unwrap_or_default();
        EditorEvent::DocumentSaved(doc.id(), path)
    }

    /// Returns the active document.
    pub fn active_document(&self) -> CoreResult<&Document> {
        self.documents.active().ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a mutable reference to the active document.
    pub fn active_document_mut(&mut self) -> CoreResult<&mut Document> {
        self.documents
            .active_mut()
            .ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a document by ID.
    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents
            .get(id)
            .ok_or(CoreError::DocumentNotFound(id))
    }

    /// Returns all open documents in tab order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    // ==================== Commands ====================

    /// Runs a command against the editor and its active document.
    pub fn execute(&mut self, command: &Command) -> CoreResult<()> {
        tracing::debug!("Executing {}", command.display_name());

        match command {
            Command::NewFile => {
                self.new_document();
            }
            Command::OpenFile { path: Some(path) } => {
                self.open_file(path)?;
            }
            Command::SaveAs { path: Some(path) } => self.save_current_as(path)?,
            Command::OpenFile { path: None } | Command::SaveAs { path: None } => {
                tracing::debug!("{} needs a path chosen by the host", command.display_name());
            }
            Command::Save => self.save_current()?,
            Command::SaveAll => {
                self.save_all()?;
            }
            Command::CloseFile => self.close_current()?,
            Command::CloseAll => self.close_all()?,
            Command::Quit => self.quit(),

            Command::CreateLineAbove => self.edit(Document::create_line_above)?,
            Command::CreateLineBelow => self.edit(Document::create_line_below)?,
            Command::DuplicateLines => self.edit(Document::duplicate_lines)?,
            Command::JoinLines { separator } => {
                let separator = separator
                    .clone()
                    .unwrap_or_else(|| self.config.editor.join_separator.clone());
                self.edit(|doc| doc.join_lines(&separator))?
            }
            Command::MoveLineUp => self.edit(Document::move_line_up)?,
            Command::MoveLineDown => self.edit(Document::move_line_down)?,
            Command::SelectLine => self.edit(Document::select_line)?,
            Command::SelectLineText => self.edit(Document::select_line_text)?,
            Command::ToUpperCase => self.edit(Document::to_upper_case)?,
            Command::ToLowerCase => self.edit(Document::to_lower_case)?,

            Command::Find {
                pattern,
                direction,
                modifiers,
            } => {
                self.find(pattern, *direction, *modifiers)?;
            }

            Command::SetLineEnding(line_ending) => self.set_line_ending(*line_ending),
        }
        Ok(())
    }

    /// Runs the command bound to a key press.
    ///
    /// Returns false when the key is not bound.
    pub fn handle_key(&mut self, key: &KeyPress) -> CoreResult<bool> {
        let Some(command) = self.keymap.lookup(key).cloned() else {
            return Ok(false);
        };
        self.execute(&command)?;
        Ok(true)
    }

    /// Applies a caret-driven operation to the active document and reports
    /// what changed.
    fn edit(&mut self, op: impl FnOnce(&mut Document) -> CoreResult<()>) -> CoreResult<()> {
        let doc = self.active_document_mut()?;
        let id = doc.id();
        let revision = doc.buffer().revision();
        let caret = *doc.caret();

        op(doc)?;

        let changed = doc.buffer().revision() != revision;
        let moved = *doc.caret() != caret;
        if changed {
            self.emit(EditorEvent::DocumentChanged(id));
        }
        if moved {
            self.emit(EditorEvent::SelectionChanged(id));
        }
        Ok(())
    }

    // ==================== Search ====================

    /// Finds the next or previous match in the active document.
    ///
    /// Returns `None` when nothing matches; a `NoMatches` event is emitted
    /// for the host to surface.
    pub fn find(
        &mut self,
        pattern: &str,
        direction: FindDirection,
        modifiers: SearchModifiers,
    ) -> CoreResult<Option<Selection>> {
        let doc = self.active_document_mut()?;
        let id = doc.id();

        match doc.find(pattern, direction, modifiers) {
            Ok(found) => {
                let wrapped = doc.search_wrapped();
                if wrapped {
                    self.emit(EditorEvent::SearchWrapped(id));
                }
                self.emit(EditorEvent::SelectionChanged(id));
                Ok(Some(found))
            }
            Err(no_matches) => {
                self.emit(EditorEvent::NoMatches {
                    pattern: no_matches.pattern,
                });
                Ok(None)
            }
        }
    }

    // ==================== Configuration ====================

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Updates the configuration.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.keymap = Keymap::from_config(&self.config);
        self.emit(EditorEvent::ConfigChanged);
    }

    /// Writes the configuration to the user's config file.
    pub fn save_config(&self) -> CoreResult<()> {
        self.config.save()?;
        Ok(())
    }

    /// Changes the terminator used when saving.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        if self.config.files.line_ending != line_ending {
            self.config.files.line_ending = line_ending;
            self.emit(EditorEvent::LineEndingChanged(line_ending));
        }
    }

    /// Returns the keymap.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    // ==================== Lifecycle ====================

    /// Signals that the editor should quit.
    pub fn quit(&mut self) {
        self.should_quit = true;
        self.emit(EditorEvent::Quit);
    }

    /// Returns true if the editor should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns true if any document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(|d| d.is_dirty())
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Key, Modifiers};
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::broadcast::Receiver;

    fn drain(rx: &mut Receiver<EditorEvent>) -> Vec<EditorEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn editor_with(text: &str) -> (Editor, DocumentId) {
        let mut editor = Editor::new();
        let id = editor.new_document();
        editor
            .active_document_mut()
            .unwrap()
            .buffer_mut()
            .insert(0, text)
            .unwrap();
        (editor, id)
    }

    #[test]
    fn test_commands_edit_active_document() {
        let (mut editor, _) = editor_with("b\na");

        editor.execute(&Command::MoveLineDown).unwrap();
        assert_eq!(editor.active_document().unwrap().text(), "a\nb");

        editor.active_document_mut().unwrap().move_caret_to(0).unwrap();
        editor.execute(&Command::DuplicateLines).unwrap();
        assert_eq!(editor.active_document().unwrap().text(), "a\na\nb");
    }

    #[test]
    fn test_join_uses_configured_separator() {
        let mut config = Config::default();
        config.editor.join_separator = "|".to_string();
        let mut editor = Editor::with_config(config);
        editor.new_document();

        let doc = editor.active_document_mut().unwrap();
        doc.buffer_mut().insert(0, "a\nb\nc").unwrap();
        doc.select(Selection::new(0, 5)).unwrap();

        editor.execute(&Command::JoinLines { separator: None }).unwrap();
        assert_eq!(editor.active_document().unwrap().text(), "a|b|c");
    }

    #[test]
    fn test_join_key_uses_configured_separator() {
        let mut config = Config::default();
        config.editor.join_separator = "; ".to_string();
        let mut editor = Editor::with_config(config);
        editor.new_document();

        let doc = editor.active_document_mut().unwrap();
        doc.buffer_mut().insert(0, "a\nb").unwrap();
        doc.select(Selection::new(0, 3)).unwrap();

        let ctrl_j = KeyPress::new(Key::Char('j'), Modifiers::CTRL);
        assert!(editor.handle_key(&ctrl_j).unwrap());
        assert_eq!(editor.active_document().unwrap().text(), "a; b");
    }

    #[test]
    fn test_handle_key() {
        let (mut editor, _) = editor_with("word");

        let ctrl_d = KeyPress::new(Key::Char('d'), Modifiers::CTRL);
        assert!(editor.handle_key(&ctrl_d).unwrap());
        assert_eq!(editor.active_document().unwrap().text(), "wordword");

        let unbound = KeyPress::new(Key::Char('q'), Modifiers::CTRL);
        assert!(!editor.handle_key(&unbound).unwrap());
    }

    #[test]
    fn test_edit_events() {
        let (mut editor, id) = editor_with("one\ntwo");
        let mut rx = editor.subscribe();

        editor.execute(&Command::SelectLine).unwrap();
        assert_eq!(drain(&mut rx), vec![EditorEvent::SelectionChanged(id)]);

        editor.execute(&Command::ToUpperCase).unwrap();
        assert_eq!(drain(&mut rx), vec![EditorEvent::DocumentChanged(id)]);

        // Already upper case: nothing changes
        editor.execute(&Command::ToUpperCase).unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_find_events() {
        let (mut editor, id) = editor_with("ab ab");
        let mut rx = editor.subscribe();

        let find = |direction| Command::Find {
            pattern: "ab".to_string(),
            direction,
            modifiers: SearchModifiers::NONE,
        };

        editor.execute(&find(FindDirection::Next)).unwrap();
        editor.execute(&find(FindDirection::Next)).unwrap();
        assert_eq!(drain(&mut rx).len(), 2);

        editor.execute(&find(FindDirection::Next)).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![EditorEvent::SearchWrapped(id), EditorEvent::SelectionChanged(id)]
        );

        let found = editor
            .find("zz", FindDirection::Next, SearchModifiers::NONE)
            .unwrap();
        assert_eq!(found, None);
        assert_eq!(
            drain(&mut rx),
            vec![EditorEvent::NoMatches {
                pattern: "zz".to_string()
            }]
        );
    }

    #[test]
    fn test_no_active_document() {
        let mut editor = Editor::new();
        assert!(matches!(
            editor.execute(&Command::DuplicateLines),
            Err(CoreError::NoActiveDocument)
        ));
        assert!(matches!(editor.save_current(), Err(CoreError::NoActiveDocument)));
    }

    #[test]
    fn test_open_save_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "line\r\n").unwrap();

        let mut editor = Editor::new();
        editor.set_line_ending(LineEnding::CrLf);
        let id = editor.open_file(&path).unwrap();
        assert_eq!(editor.open_file(&path).unwrap(), id);
        assert_eq!(editor.documents().count(), 1);

        editor.execute(&Command::CreateLineBelow).unwrap();
        assert!(editor.has_unsaved_changes());

        editor.execute(&Command::Save).unwrap();
        assert!(!editor.has_unsaved_changes());
        assert_eq!(fs::read_to_string(&path).unwrap(), "line\r\n\r\n");

        editor.execute(&Command::CloseFile).unwrap();
        assert!(editor.active_document().is_err());
    }

    #[test]
    fn test_save_untitled_needs_path() {
        let (mut editor, _) = editor_with("text");
        assert!(matches!(editor.save_current(), Err(CoreError::NoPath)));
        assert_eq!(editor.save_all().unwrap(), 0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("named.txt");
        editor
            .execute(&Command::SaveAs {
                path: Some(path.clone()),
            })
            .unwrap();
        assert_eq!(editor.active_document().unwrap().name(), "named.txt");
        assert_eq!(editor.save_all().unwrap(), 1);
    }

    #[test]
    fn test_close_all_and_quit() {
        let mut editor = Editor::new();
        editor.new_document();
        editor.new_document();

        editor.execute(&Command::CloseAll).unwrap();
        assert_eq!(editor.documents().count(), 0);

        editor.execute(&Command::Quit).unwrap();
        assert!(editor.should_quit());
    }

    #[test]
    fn test_set_line_ending_event() {
        let mut editor = Editor::new();
        let mut rx = editor.subscribe();

        editor.execute(&Command::SetLineEnding(LineEnding::Cr)).unwrap();
        editor.execute(&Command::SetLineEnding(LineEnding::Cr)).unwrap();
        assert_eq!(editor.config().files.line_ending, LineEnding::Cr);
        assert_eq!(drain(&mut rx), vec![EditorEvent::LineEndingChanged(LineEnding::Cr)]);
    }
}
