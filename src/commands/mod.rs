//! Symbol commands and the shortcut table behind the on-screen keyboard.
//!
//! Every key on the chemistry keyboard is a [`SymbolCommand`]. The
//! [`CommandTable`] keeps them in definition order for rendering and indexes
//! the ones that carry a [`ChordSpec`] for shortcut lookup.

mod chord;
mod keyboard;

use std::collections::HashMap;
use std::sync::LazyLock;

pub use chord::{ChordParseError, ChordSpec};
pub use keyboard::{KEYBOARD_COLUMNS, chemistry_keyboard, keyboard_rows};

use crate::shortcut::Platform;

static CHEMISTRY_TABLE: LazyLock<CommandTable> =
    LazyLock::new(|| CommandTable::new(chemistry_keyboard()));

/// What a key does to the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Structural insert (superscript, subscript, bracket pair, ...).
    InsertCommand,
    /// Literal LaTeX text, possibly several characters.
    WriteText,
    /// Named navigation or edit keystroke such as `Left` or `Backspace`.
    Keystroke,
    /// Empty the surface.
    Clear,
}

/// One key of the symbol keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCommand {
    /// Text shown on the key cap
    pub label: String,
    pub kind: OperationKind,
    /// Argument handed to the surface; empty only for [`OperationKind::Clear`]
    pub payload: String,
    pub shortcut: Option<ChordSpec>,
    pub title: Option<String>,
    /// Number of keyboard grid columns the key occupies
    pub span: u16,
}

impl SymbolCommand {
    fn new(label: &str, kind: OperationKind, payload: &str) -> Self {
        Self {
            label: label.to_string(),
            kind,
            payload: payload.to_string(),
            shortcut: None,
            title: None,
            span: 1,
        }
    }

    /// A structural insert key.
    pub fn command(label: &str, payload: &str) -> Self {
        Self::new(label, OperationKind::InsertCommand, payload)
    }

    /// A literal text key.
    pub fn write(label: &str, payload: &str) -> Self {
        Self::new(label, OperationKind::WriteText, payload)
    }

    /// A keystroke replay key.
    pub fn keystroke(label: &str, payload: &str) -> Self {
        Self::new(label, OperationKind::Keystroke, payload)
    }

    /// The clear key.
    pub fn clear(label: &str) -> Self {
        Self::new(label, OperationKind::Clear, "")
    }

    /// Attach a shortcut chord.
    pub fn with_shortcut(mut self, chord: ChordSpec) -> Self {
        self.shortcut = Some(chord);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_span(mut self, span: u16) -> Self {
        self.span = span.max(1);
        self
    }

    /// The key part of the shortcut, shown as a badge on the key cap.
    pub fn shortcut_hint(&self) -> Option<char> {
        self.shortcut.as_ref().map(ChordSpec::key)
    }

    /// Hover text: the explicit title, else the shortcut chord.
    pub fn tooltip(&self, platform: Platform) -> Option<String> {
        if let Some(title) = &self.title {
            return Some(title.clone());
        }
        self.shortcut
            .as_ref()
            .map(|chord| format!("Shortcut: {}", chord.display(platform)))
    }
}

/// A shortcut that was registered twice; the later command won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub chord: ChordSpec,
    /// Index of the command that lost the chord
    pub shadowed: usize,
    /// Index of the command that now owns it
    pub winner: usize,
}

/// Ordered symbol commands plus a shortcut index.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: Vec<SymbolCommand>,
    shortcuts: HashMap<ChordSpec, usize>,
    collisions: Vec<Collision>,
}

impl CommandTable {
    /// Build the table. Duplicate shortcuts resolve to the last command
    /// that declares them; each such overwrite is kept in [`Self::collisions`].
    pub fn new(commands: Vec<SymbolCommand>) -> Self {
        let mut shortcuts = HashMap::new();
        let mut collisions = Vec::new();
        for (idx, command) in commands.iter().enumerate() {
            let Some(chord) = command.shortcut.clone() else {
                continue;
            };
            if let Some(previous) = shortcuts.insert(chord.clone(), idx) {
                tracing::warn!(
                    chord = %chord,
                    shadowed = %commands[previous].label,
                    winner = %command.label,
                    "duplicate keyboard shortcut, last definition wins"
                );
                collisions.push(Collision {
                    chord,
                    shadowed: previous,
                    winner: idx,
                });
            }
        }
        Self {
            commands,
            shortcuts,
            collisions,
        }
    }

    /// The process-wide chemistry keyboard.
    pub fn chemistry() -> &'static Self {
        &CHEMISTRY_TABLE
    }

    pub fn resolve_by_shortcut(&self, chord: &ChordSpec) -> Option<&SymbolCommand> {
        self.shortcuts.get(chord).map(|&idx| &self.commands[idx])
    }

    /// All commands in definition order.
    pub fn all_commands(&self) -> &[SymbolCommand] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&SymbolCommand> {
        self.commands.get(index)
    }

    /// Grid index of `command`, compared by identity rather than content.
    pub fn position(&self, command: &SymbolCommand) -> Option<usize> {
        self.commands.iter().position(|c| std::ptr::eq(c, command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }
}
