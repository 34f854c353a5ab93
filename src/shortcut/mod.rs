//! Keyboard shortcut resolution.
//!
//! Shortcuts are `Alt+Shift+<key>` chords (`Option+Shift` on macOS). The
//! resolver normalizes a raw key press into a canonical [`ChordSpec`] and
//! looks it up in a [`CommandTable`]. Listeners that feed it are registered
//! through [`KeyListeners`] and live exactly as long as their guard.

mod listeners;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use listeners::{KeyListeners, ListenerGuard, ListenerKind};

use crate::commands::{ChordSpec, CommandTable, SymbolCommand};

/// Operating system family, used only for modifier labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else {
            Self::Other
        }
    }

    /// Name of the alt modifier on this platform.
    pub const fn alt_label(self) -> &'static str {
        match self {
            Self::Mac => "Option",
            Self::Other => "Alt",
        }
    }
}

/// Where a key press was aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    /// The math editing surface has focus
    Surface,
    /// Anything else (keyboard grid, tabs, host text)
    Elsewhere,
}

/// A raw key press with its focus target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub target: KeyTarget,
}

impl KeyPress {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers, target: KeyTarget) -> Self {
        Self {
            code,
            modifiers,
            target,
        }
    }

    pub const fn from_event(event: KeyEvent, target: KeyTarget) -> Self {
        Self::new(event.code, event.modifiers, target)
    }
}

/// Outcome of resolving a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Suppress the key's default handling and run the command
    Consume(&'a SymbolCommand),
    /// Not a shortcut here; let the host handle the key
    PassThrough,
}

/// Maps raw key presses to symbol commands.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutResolver<'a> {
    table: &'a CommandTable,
    platform: Platform,
}

impl<'a> ShortcutResolver<'a> {
    pub const fn new(table: &'a CommandTable, platform: Platform) -> Self {
        Self { table, platform }
    }

    pub const fn platform(&self) -> Platform {
        self.platform
    }

    pub fn resolve(&self, press: &KeyPress) -> Resolution<'a> {
        let Some(command) = self.lookup(press) else {
            return Resolution::PassThrough;
        };
        if press.target == KeyTarget::Surface {
            Resolution::Consume(command)
        } else {
            Resolution::PassThrough
        }
    }

    fn lookup(&self, press: &KeyPress) -> Option<&'a SymbolCommand> {
        let mods = press.modifiers;
        let KeyCode::Char(ch) = press.code else {
            return None;
        };
        let alt_like = mods.intersects(KeyModifiers::ALT | KeyModifiers::META | KeyModifiers::SUPER);
        // Legacy terminal encodings report Alt+Shift+6 as Alt+'^' with no SHIFT bit.
        let shift_held = mods.contains(KeyModifiers::SHIFT) || unshifted(ch).is_some();
        if !alt_like || !shift_held || mods.contains(KeyModifiers::CONTROL) {
            return None;
        }
        let literal = ch.to_ascii_uppercase();
        [Some(literal), unshifted(literal)]
            .into_iter()
            .flatten()
            .filter(|&key| is_shortcut_key(key))
            .find_map(|key| self.table.resolve_by_shortcut(&ChordSpec::alt_shift(key)))
    }
}

/// Keys that may take part in a shortcut chord.
pub const fn is_shortcut_key(key: char) -> bool {
    matches!(
        key,
        'A'..='Z' | '0'..='9' | '=' | '<' | '>' | '+' | '-' | '*' | '/' | '.' | ','
    )
}

/// US-layout physical key behind a shifted symbol.
const fn unshifted(ch: char) -> Option<char> {
    Some(match ch {
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        '_' => '-',
        '+' => '=',
        '<' => ',',
        '>' => '.',
        '?' => '/',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(ch: char, modifiers: KeyModifiers) -> KeyPress {
        KeyPress::new(KeyCode::Char(ch), modifiers, KeyTarget::Surface)
    }

    fn alt_shift() -> KeyModifiers {
        KeyModifiers::ALT | KeyModifiers::SHIFT
    }

    #[test]
    fn test_shift_only_never_resolves() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        for ch in ['6', '.', ',', '=', '-', 'A'] {
            assert_eq!(
                resolver.resolve(&press(ch, KeyModifiers::SHIFT)),
                Resolution::PassThrough
            );
        }
    }

    #[test]
    fn test_alt_without_shift_passes_through() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        assert_eq!(
            resolver.resolve(&press('6', KeyModifiers::ALT)),
            Resolution::PassThrough
        );
    }

    #[test]
    fn test_alt_shift_6_resolves_identically_on_every_platform() {
        let table = CommandTable::chemistry();
        let mac = ShortcutResolver::new(table, Platform::Mac);
        let other = ShortcutResolver::new(table, Platform::Other);
        let Resolution::Consume(a) = mac.resolve(&press('6', alt_shift())) else {
            panic!("expected a command on mac");
        };
        let Resolution::Consume(b) = other.resolve(&press('6', alt_shift())) else {
            panic!("expected a command elsewhere");
        };
        assert_eq!(a, b);
        assert_eq!(a.payload, "^");
    }

    #[test]
    fn test_shifted_symbol_with_alt_only_resolves() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        let expected = [('^', "^"), ('_', "_"), ('+', "+"), ('>', "\\rightarrow")];
        for (ch, payload) in expected {
            let event = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::ALT);
            let press = KeyPress::from_event(event, KeyTarget::Surface);
            assert!(
                matches!(resolver.resolve(&press), Resolution::Consume(cmd) if cmd.payload == payload),
                "{ch}"
            );
        }
        let reversible = press('<', KeyModifiers::ALT);
        assert!(matches!(
            resolver.resolve(&reversible),
            Resolution::Consume(cmd) if cmd.payload == "\\rightleftharpoons"
        ));
        assert_eq!(
            resolver.resolve(&press('^', KeyModifiers::NONE)),
            Resolution::PassThrough
        );
        assert_eq!(
            resolver.resolve(&press('-', KeyModifiers::ALT)),
            Resolution::PassThrough
        );
    }

    #[test]
    fn test_meta_and_super_count_as_alt() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Mac);
        for alt in [KeyModifiers::META, KeyModifiers::SUPER] {
            assert!(matches!(
                resolver.resolve(&press('.', alt | KeyModifiers::SHIFT)),
                Resolution::Consume(cmd) if cmd.payload == "\\rightarrow"
            ));
        }
    }

    #[test]
    fn test_control_disqualifies_chord() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        assert_eq!(
            resolver.resolve(&press('6', alt_shift() | KeyModifiers::CONTROL)),
            Resolution::PassThrough
        );
    }

    #[test]
    fn test_shifted_symbol_maps_to_physical_key() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        assert!(matches!(
            resolver.resolve(&press('^', alt_shift())),
            Resolution::Consume(cmd) if cmd.payload == "^"
        ));
        assert!(matches!(
            resolver.resolve(&press('_', alt_shift())),
            Resolution::Consume(cmd) if cmd.payload == "_"
        ));
        assert!(matches!(
            resolver.resolve(&press('+', alt_shift())),
            Resolution::Consume(cmd) if cmd.payload == "+"
        ));
    }

    #[test]
    fn test_keys_outside_class_pass_through() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        for ch in ['[', ';', 'é', ' '] {
            assert_eq!(resolver.resolve(&press(ch, alt_shift())), Resolution::PassThrough);
        }
        let enter = KeyPress::new(KeyCode::Enter, alt_shift(), KeyTarget::Surface);
        assert_eq!(resolver.resolve(&enter), Resolution::PassThrough);
    }

    #[test]
    fn test_match_outside_surface_is_not_consumed() {
        let resolver = ShortcutResolver::new(CommandTable::chemistry(), Platform::Other);
        let elsewhere = KeyPress::new(KeyCode::Char('6'), alt_shift(), KeyTarget::Elsewhere);
        assert_eq!(resolver.resolve(&elsewhere), Resolution::PassThrough);
    }

    #[test]
    fn test_shortcut_key_class() {
        assert!(is_shortcut_key('Q'));
        assert!(is_shortcut_key('/'));
        assert!(!is_shortcut_key('q'));
        assert!(!is_shortcut_key('^'));
    }
}
