//! Reading and writing documents on disk.
//!
//! ## Learning: Keeping I/O at the Edge
//!
//! The buffer never touches the file system and only ever sees `'\n'`.
//! Everything platform specific happens here: terminators are normalized
//! on the way in and translated on the way out, and writes go through a
//! temporary file that is renamed over the target.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zephyr_buffer::TextBuffer;

use crate::{CoreError, CoreResult};

/// Line terminator used when writing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix-style: \n
    Lf,
    /// Windows-style: \r\n
    CrLf,
    /// Classic Mac: \r
    Cr,
}

impl Default for LineEnding {
    fn default() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

impl LineEnding {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Detects line ending from text.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else if text.contains('\r') {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }

    /// Translates `'\n'` terminators into this line ending.
    pub fn apply(&self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            other => text.replace('\n', other.as_str()),
        }
    }

    /// Translates `\r\n` and lone `\r` terminators into `'\n'`.
    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n").replace('\r', "\n")
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LineEnding::Lf => "LF",
            LineEnding::CrLf => "CRLF",
            LineEnding::Cr => "CR",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lf" | "unix" => Ok(LineEnding::Lf),
            "crlf" | "windows" => Ok(LineEnding::CrLf),
            "cr" | "mac" => Ok(LineEnding::Cr),
            _ => Err(format!("Unknown line ending: {s}")),
        }
    }
}

/// Moves documents between disk and memory.
pub struct DocumentStreamer;

impl DocumentStreamer {
    /// Reads a file into a new buffer.
    pub fn read(path: impl AsRef<Path>) -> CoreResult<TextBuffer> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let content = LineEnding::normalize(&raw);

        tracing::info!(path = %path.display(), chars = content.chars().count(), "Opened document");
        Ok(TextBuffer::open(file_name(path), path, &content))
    }

    /// Writes a buffer back to its own path.
    pub fn write(buffer: &mut TextBuffer, line_ending: LineEnding) -> CoreResult<()> {
        let path = buffer.path().map(Path::to_path_buf).ok_or(CoreError::NoPath)?;
        Self::flush(buffer, &path, line_ending)
    }

    /// Writes a buffer to a new path and renames it after the file.
    pub fn write_as(buffer: &mut TextBuffer, path: impl AsRef<Path>, line_ending: LineEnding) -> CoreResult<()> {
        let path = path.as_ref();
        Self::flush(buffer, path, line_ending)?;
        buffer.set_name(file_name(path));
        Ok(())
    }

    /// Removes the file backing `buffer`.
    ///
    /// Returns false when there was no file to remove.
    pub fn delete(buffer: &TextBuffer) -> CoreResult<bool> {
        let Some(path) = buffer.path() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(path)?;
        tracing::info!(path = %path.display(), "Deleted document");
        Ok(true)
    }

    fn flush(buffer: &mut TextBuffer, path: &Path, line_ending: LineEnding) -> CoreResult<()> {
        let content = line_ending.apply(&buffer.text());

        // Write to a temporary file first, then rename (atomic write)
        let temp_path = temp_path(path);
        if let Err(err) = fs::write(&temp_path, content.as_bytes())
            .and_then(|()| fs::rename(&temp_path, path))
        {
            let _ = fs::remove_file(&temp_path);
            tracing::warn!(path = %path.display(), error = %err, "Failed to save document");
            return Err(err.into());
        }

        buffer.mark_saved(path);
        tracing::info!(path = %path.display(), %line_ending, "Saved document");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
