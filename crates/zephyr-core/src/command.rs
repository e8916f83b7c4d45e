//! Named editor actions.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - Menus, key bindings and the command line all produce the same `Command`
//! - `Editor::execute` is the single place that interprets them
//!
//! Every command also has a stable kebab-case name, used by key binding
//! overrides in the config file.

use std::path::PathBuf;

use crate::finder::{FindDirection, SearchModifiers};
use crate::streamer::LineEnding;

/// Built-in editor commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // File commands
    NewFile,
    /// Open a file; `None` leaves picking the file to the host
    OpenFile { path: Option<PathBuf> },
    Save,
    /// Save under a new path; `None` leaves picking the path to the host
    SaveAs { path: Option<PathBuf> },
    SaveAll,
    CloseFile,
    CloseAll,
    Quit,

    // Line commands
    CreateLineAbove,
    CreateLineBelow,
    DuplicateLines,
    /// Join the selected lines; `None` uses the configured separator
    JoinLines { separator: Option<String> },
    MoveLineUp,
    MoveLineDown,
    SelectLine,
    SelectLineText,

    // Case
    ToUpperCase,
    ToLowerCase,

    // Search
    Find {
        pattern: String,
        direction: FindDirection,
        modifiers: SearchModifiers,
    },

    // Document settings
    SetLineEnding(LineEnding),
}

impl Command {
    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::NewFile => "New File",
            Command::OpenFile { .. } => "Open File",
            Command::Save => "Save",
            Command::SaveAs { .. } => "Save As",
            Command::SaveAll => "Save All",
            Command::CloseFile => "Close File",
            Command::CloseAll => "Close All",
            Command::Quit => "Quit",
            Command::CreateLineAbove => "Create Line Above",
            Command::CreateLineBelow => "Create Line Below",
            Command::DuplicateLines => "Duplicate Lines",
            Command::JoinLines { .. } => "Join Lines",
            Command::MoveLineUp => "Move Line Up",
            Command::MoveLineDown => "Move Line Down",
            Command::SelectLine => "Select Line",
            Command::SelectLineText => "Select Line Text",
            Command::ToUpperCase => "To Upper Case",
            Command::ToLowerCase => "To Lower Case",
            Command::Find {
                direction: FindDirection::Next,
                ..
            } => "Find Next",
            Command::Find {
                direction: FindDirection::Previous,
                ..
            } => "Find Previous",
            Command::SetLineEnding(_) => "Set Line Ending",
        }
    }

    /// Returns true if the command edits the active document's content.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::CreateLineAbove
                | Command::CreateLineBelow
                | Command::DuplicateLines
                | Command::JoinLines { .. }
                | Command::MoveLineUp
                | Command::MoveLineDown
                | Command::ToUpperCase
                | Command::ToLowerCase
        )
    }
}

impl std::str::FromStr for Command {
    type Err = String;

    /// Parses a command name as used in key binding overrides.
    ///
    /// Commands that need arguments parse to their argument-less form.
    /// `find` has no such form and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_lowercase().as_str() {
            "new-file" => Command::NewFile,
            "open-file" => Command::OpenFile { path: None },
            "save" => Command::Save,
            "save-as" => Command::SaveAs { path: None },
            "save-all" => Command::SaveAll,
            "close-file" => Command::CloseFile,
            "close-all" => Command::CloseAll,
            "quit" => Command::Quit,
            "create-line-above" => Command::CreateLineAbove,
            "create-line-below" => Command::CreateLineBelow,
            "duplicate-lines" => Command::DuplicateLines,
            "join-lines" => Command::JoinLines { separator: None },
            "move-line-up" => Command::MoveLineUp,
            "move-line-down" => Command::MoveLineDown,
            "select-line" => Command::SelectLine,
            "select-line-text" => Command::SelectLineText,
            "to-upper-case" => Command::ToUpperCase,
            "to-lower-case" => Command::ToLowerCase,
            "line-ending-lf" => Command::SetLineEnding(LineEnding::Lf),
            "line-ending-crlf" => Command::SetLineEnding(LineEnding::CrLf),
            "line-ending-cr" => Command::SetLineEnding(LineEnding::Cr),
            _ => return Err(format!("Unknown command: {s}")),
        };
        Ok(command)
    }
}
