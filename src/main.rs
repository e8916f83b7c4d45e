//! # Zephyr
//!
//! A headless front end for the Zephyr editor core: open a file, run a
//! find, a line command or a line-ending conversion, and print or save
//! the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Walk through the matches of a word
//! cargo run -- find notes.txt todo --count 3
//!
//! # Duplicate the line at offset 42 and print the result
//! cargo run -- apply notes.txt duplicate-lines --at 42
//!
//! # Rewrite a file with Windows line endings
//! cargo run -- convert notes.txt --to crlf
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zephyr_buffer::Selection;
use zephyr_core::{Command, Config, Editor, FindDirection, LineEnding, SearchModifiers};

/// Zephyr - line editing and search from the command line
#[derive(Parser, Debug)]
#[command(name = "zephyr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default one
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Find a pattern, printing each selected match
    Find {
        /// File to search
        file: PathBuf,

        /// Text to look for
        pattern: String,

        /// Search towards the start of the file
        #[arg(short, long)]
        previous: bool,

        /// Only match whole words
        #[arg(short, long)]
        whole_word: bool,

        /// Compare case-sensitively
        #[arg(short = 'm', long)]
        match_case: bool,

        /// Treat the pattern as a regular expression (not supported yet)
        #[arg(long)]
        regex: bool,

        /// Caret offset to start from
        #[arg(long, default_value_t = 0)]
        at: usize,

        /// Number of consecutive find requests
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Run a line command (e.g. duplicate-lines, move-line-up, join-lines)
    Apply {
        /// File to edit
        file: PathBuf,

        /// Command name
        command: Command,

        /// Caret offset (selection start when --to is given)
        #[arg(long, default_value_t = 0)]
        at: usize,

        /// Selection end
        #[arg(long)]
        to: Option<usize>,

        /// Separator for join-lines (defaults to the configured one)
        #[arg(long)]
        separator: Option<String>,

        /// Save the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },

    /// Rewrite a file with the given line endings
    Convert {
        /// File to convert
        file: PathBuf,

        /// Target line ending: lf, crlf or cr
        #[arg(long, value_name = "ENDING")]
        to: LineEnding,

        /// Write to this path instead of overwriting the input
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Zephyr v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let mut editor = Editor::with_config(config);
    for line in run(&mut editor, args.action)? {
        println!("{line}");
    }

    Ok(())
}

/// Executes one action and returns the lines to print.
fn run(editor: &mut Editor, action: Action) -> anyhow::Result<Vec<String>> {
    let mut output = Vec::new();

    match action {
        Action::Find {
            file,
            pattern,
            previous,
            whole_word,
            match_case,
            regex,
            at,
            count,
        } => {
            open(editor, &file)?;
            editor.active_document_mut()?.move_caret_to(at)?;

            let direction = if previous {
                FindDirection::Previous
            } else {
                FindDirection::Next
            };
            let modifiers = SearchModifiers {
                whole_word,
                match_case,
                regex,
            };

            for _ in 0..count {
                match editor.find(&pattern, direction, modifiers)? {
                    Some(found) => output.push(describe(editor, found)?),
                    None => {
                        output.push(format!("No matches for \"{pattern}\""));
                        break;
                    }
                }
            }
        }

        Action::Apply {
            file,
            command,
            at,
            to,
            separator,
            write,
        } => {
            open(editor, &file)?;
            let doc = editor.active_document_mut()?;
            match to {
                Some(end) => doc.select(Selection::new(at, end))?,
                None => doc.move_caret_to(at)?,
            }

            let command = match command {
                Command::JoinLines { separator: None } => Command::JoinLines { separator },
                other => other,
            };
            editor.execute(&command)?;

            if write {
                editor.save_current()?;
                output.push(format!("Saved {}", file.display()));
            } else {
                output.push(editor.active_document()?.text().into_owned());
            }
        }

        Action::Convert { file, to, output: target } => {
            open(editor, &file)?;
            editor.set_line_ending(to);
            match &target {
                Some(path) => editor.save_current_as(path)?,
                None => editor.save_current()?,
            }
            let written = target.as_ref().unwrap_or(&file);
            output.push(format!("Wrote {} with {} line endings", written.display(), to));
        }
    }

    Ok(output)
}

fn open(editor: &mut Editor, file: &Path) -> anyhow::Result<()> {
    editor
        .open_file(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(())
}

/// Formats a match as `line:column [start, end) text`.
fn describe(editor: &Editor, found: Selection) -> anyhow::Result<String> {
    let doc = editor.active_document()?;
    let position = doc.buffer().char_idx_to_position(found.start)?;
    let text = doc.buffer().read(found.start, found.len())?;
    Ok(format!("{position} {found} {text}"))
}
