//! # Zephyr Core
//!
//! Everything between a host UI and the text buffer.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Editor                           │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌─────────────┐  │
//! │  │  Config  │ │  Keymap  │ │ EventBus │ │   Command   │  │
//! │  └──────────┘ └──────────┘ └──────────┘ └─────────────┘  │
//! │         │                                                │
//! │  ┌──────┴───────────────────────────────────────┐        │
//! │  │               Document Manager                │        │
//! │  │  ┌───────────────────────────────────────┐    │        │
//! │  │  │ Document: TextBuffer + Caret + Search │    │        │
//! │  │  └───────────────────────────────────────┘    │        │
//! │  └──────────────────────────────────────────────┘        │
//! │         │                                                │
//! │  DocumentStreamer (disk)   SearchSession ── Finder        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod finder;
pub mod keymap;
pub mod session;
pub mod streamer;

pub use command::Command;
pub use config::{Config, ConfigError};
pub use document::{Document, DocumentId, DocumentManager};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use finder::{FindDirection, Finder, SearchModifiers, SearchState};
pub use keymap::{Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use session::{NoMatches, SearchSession};
pub use streamer::{DocumentStreamer, LineEnding};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Document has no file path")]
    NoPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] zephyr_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
