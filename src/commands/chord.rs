use std::fmt;
use std::str::FromStr;

use crate::shortcut::Platform;

/// Why a chord string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordParseError {
    #[error("empty shortcut")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("shortcut key must be a single character, got `{0}`")]
    InvalidKey(String),
}

/// A normalized `modifier+modifier+key` combination.
///
/// The key is stored uppercased and `option` is folded into `alt`, so
/// `"option+shift+a"` and `"Alt+Shift+A"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordSpec {
    ctrl: bool,
    alt: bool,
    shift: bool,
    key: char,
}

impl ChordSpec {
    /// The `ALT+SHIFT+<key>` chord every keyboard shortcut uses.
    pub fn alt_shift(key: char) -> Self {
        Self {
            ctrl: false,
            alt: true,
            shift: true,
            key: key.to_ascii_uppercase(),
        }
    }

    pub const fn key(&self) -> char {
        self.key
    }

    pub const fn has_alt(&self) -> bool {
        self.alt
    }

    pub const fn has_shift(&self) -> bool {
        self.shift
    }

    pub const fn has_ctrl(&self) -> bool {
        self.ctrl
    }

    /// Human label using the platform's name for the alt key.
    pub fn display(&self, platform: Platform) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.alt {
            parts.push(platform.alt_label().to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.to_string());
        parts.join("+")
    }
}

impl fmt::Display for ChordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("CTRL+")?;
        }
        if self.alt {
            f.write_str("ALT+")?;
        }
        if self.shift {
            f.write_str("SHIFT+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for ChordSpec {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordParseError::Empty);
        }
        // A trailing "++" means the key itself is '+'.
        let (mods, key) = if let Some(mods) = s.strip_suffix("++") {
            (mods, "+")
        } else if s == "+" {
            ("", "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };

        let mut chars = key.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_uppercase(),
            _ => return Err(ChordParseError::InvalidKey(key.to_string())),
        };

        let mut chord = Self {
            ctrl: false,
            alt: false,
            shift: false,
            key,
        };
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.trim().to_ascii_lowercase().as_str() {
                "alt" | "option" | "opt" => chord.alt = true,
                "shift" => chord.shift = true,
                "ctrl" | "control" => chord.ctrl = true,
                other => return Err(ChordParseError::UnknownModifier(other.to_string())),
            }
        }
        Ok(chord)
    }
}
