//! Keyboard mapping.
//!
//! Every binding is a single key chord (modifiers plus one key). The
//! defaults mirror the editor's menu accelerators; entries from
//! `Config.keyboard.bindings` are applied on top and replace a default
//! bound to the same chord.

use crate::command::Command;
use crate::config::Config;
use std::collections::HashMap;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Alt modifier.
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Ctrl+Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };

    /// Ctrl+Alt.
    pub const CTRL_ALT: Modifiers = Modifiers {
        ctrl: true,
        alt: true,
        ..Modifiers::NONE
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Parses modifier names joined by `+`, like "ctrl+shift".
    ///
    /// Returns `None` on an unknown name.
    pub fn parse(s: &str) -> Option<Self> {
        let mut mods = Modifiers::NONE;
        for part in s.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "shift" => mods.shift = true,
                "meta" | "cmd" | "win" | "super" => mods.meta = true,
                _ => return None,
            }
        }
        Some(mods)
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, stored lower-case
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8), // F1-F12
    Space,
}

impl Key {
    /// Parses a key from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "backspace" | "bs" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "escape" | "esc" => Some(Key::Escape),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdn" => Some(Key::PageDown),
            "space" => Some(Key::Space),
            _ if lower.starts_with('f') && lower.len() <= 3 && lower.len() > 1 => {
                lower[1..].parse().ok().map(Key::F)
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Escape => write!(f, "Escape"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::F(n) => write!(f, "F{}", n),
            Key::Space => write!(f, "Space"),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses a chord like "ctrl+s" or "ctrl+alt+up".
    pub fn parse(s: &str) -> Option<Self> {
        let (mod_str, key_str) = match s.rsplit_once('+') {
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };
        Some(Self {
            key: Key::parse(key_str)?,
            modifiers: Modifiers::parse(mod_str)?,
        })
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// A key binding maps a key chord to a command.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub command: Command,
}

impl KeyBinding {
    pub fn new(key: KeyPress, command: Command) -> Self {
        Self { key, command }
    }
}

/// Keyboard mapping configuration.
pub struct Keymap {
    /// All key bindings, later entries win.
    bindings: Vec<KeyBinding>,
    /// Index from chord to its effective binding.
    by_key: HashMap<KeyPress, usize>,
}

impl Keymap {
    /// Creates a keymap with the default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: Vec::new(),
            by_key: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap.rebuild_index();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// Entries whose chord or command name does not parse are skipped with
    /// a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (key_str, cmd_str) in &config.keyboard.bindings {
            let Some(key) = KeyPress::parse(key_str) else {
                tracing::warn!("Ignoring binding with unknown key chord: {key_str}");
                continue;
            };
            match cmd_str.parse::<Command>() {
                Ok(command) => keymap.bindings.push(KeyBinding::new(key, command)),
                Err(e) => tracing::warn!("Ignoring binding for {key_str}: {e}"),
            }
        }

        keymap.rebuild_index();
        keymap
    }

    fn add_default_bindings(&mut self) {
        use crate::command::Command::*;

        let ch = Key::Char;
        let bindings = [
            // File operations
            (ch('n'), Modifiers::CTRL, NewFile),
            (ch('o'), Modifiers::CTRL, OpenFile { path: None }),
            (ch('s'), Modifiers::CTRL, Save),
            (ch('s'), Modifiers::CTRL_ALT, SaveAs { path: None }),
            (ch('s'), Modifiers::CTRL_SHIFT, SaveAll),
            (ch('w'), Modifiers::CTRL, CloseFile),
            (ch('w'), Modifiers::CTRL_SHIFT, CloseAll),
            (Key::F(4), Modifiers::ALT, Quit),
            // Line operations
            (Key::Enter, Modifiers::CTRL, CreateLineBelow),
            (Key::Enter, Modifiers::CTRL_SHIFT, CreateLineAbove),
            (Key::Up, Modifiers::ALT, MoveLineUp),
            (Key::Down, Modifiers::ALT, MoveLineDown),
            (ch('d'), Modifiers::CTRL, DuplicateLines),
            (ch('j'), Modifiers::CTRL, JoinLines { separator: None }),
            (ch('a'), Modifiers::CTRL_SHIFT, SelectLine),
            (ch('a'), Modifiers::CTRL_ALT, SelectLineText),
            // Case
            (Key::Up, Modifiers::CTRL_ALT, ToUpperCase),
            (Key::Down, Modifiers::CTRL_ALT, ToLowerCase),
        ];

        for (key, modifiers, command) in bindings {
            self.bindings.push(KeyBinding::new(KeyPress::new(key, modifiers), command));
        }
    }

    fn rebuild_index(&mut self) {
        self.by_key = self
            .bindings
            .iter()
            .enumerate()
            .map(|(i, binding)| (binding.key.clone(), i))
            .collect();
    }

    /// Returns the command bound to a key press.
    pub fn lookup(&self, key: &KeyPress) -> Option<&Command> {
        self.by_key.get(key).map(|&i| &self.bindings[i].command)
    }

    /// Returns all bindings, including overridden ones.
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Adds a binding, replacing any binding for the same chord.
    pub fn add_binding(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
        self.rebuild_index();
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
