//! Key naming for keystroke commands.
//!
//! The canonical representation is a lowercase key name (`"a"`, `"escape"`,
//! `"pageup"`, `"="`) plus a list of [`Modifier`]s.  Clients may spell
//! modifiers several ways (`cmd`, `command`, `opt`, `option`, ...); they are
//! normalised here before a command reaches the injection unit.  Platform key
//! names are produced at the native boundary by the [`x11`] table.

pub mod x11;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing key descriptions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeymapError {
    /// A modifier token has no known alias.
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    /// The shortcut string has no key after the modifiers.
    #[error("shortcut has no key: {0:?}")]
    EmptyShortcut(String),
}

/// A held modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// The platform's primary shortcut modifier.
    Command,
    Alt,
    Control,
    Shift,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Alt => "alt",
            Self::Control => "control",
            Self::Shift => "shift",
        }
    }

    /// Parses every modifier in `names`, failing on the first unknown alias.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::UnknownModifier`] for an unrecognised token.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Modifier>, KeymapError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl FromStr for Modifier {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cmd" | "command" | "meta" | "super" => Ok(Self::Command),
            "opt" | "option" | "alt" => Ok(Self::Alt),
            "ctrl" | "control" => Ok(Self::Control),
            "shift" => Ok(Self::Shift),
            _ => Err(KeymapError::UnknownModifier(s.to_string())),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key plus the modifiers held while it is tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub modifiers: Vec<Modifier>,
}

impl KeyChord {
    pub fn new(key: impl Into<String>, modifiers: &[Modifier]) -> Self {
        Self {
            key: key.into(),
            modifiers: modifiers.to_vec(),
        }
    }

    /// A chord with no modifiers.
    pub fn bare(key: impl Into<String>) -> Self {
        Self::new(key, &[])
    }
}

/// Parses a shortcut written as `"cmd+shift+c"`.
///
/// The string is lowercased; the last `+`-separated token is the key and the
/// rest are modifiers.  A trailing `+` means the plus key itself
/// (`"cmd++"`).
///
/// # Errors
///
/// Returns [`KeymapError::EmptyShortcut`] for an empty string and
/// [`KeymapError::UnknownModifier`] for an unrecognised modifier token.
pub fn parse_shortcut(shortcut: &str) -> Result<KeyChord, KeymapError> {
    let lowered = shortcut.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err(KeymapError::EmptyShortcut(shortcut.to_string()));
    }

    let (head, key) = if let Some(head) = lowered.strip_suffix("++") {
        (head, "+")
    } else {
        match lowered.rsplit_once('+') {
            Some((head, key)) => (head, key),
            None => ("", lowered.as_str()),
        }
    };
    if key.is_empty() {
        return Err(KeymapError::EmptyShortcut(shortcut.to_string()));
    }

    let modifiers = head
        .split('+')
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Modifier>, _>>()?;

    Ok(KeyChord::new(key, &modifiers))
}

/// Maps an on-screen editing action to its canonical key name.
///
/// Unmapped actions pass through unchanged so the native layer can try them
/// as literal key names.
pub fn special_key(action: &str) -> String {
    let mapped = match action {
        "enter" => "enter",
        "tab" => "tab",
        "esc" | "escape" => "escape",
        "delete" | "backspace" => "backspace",
        "space" => "space",
        "up" => "up",
        "down" => "down",
        "left" => "left",
        "right" => "right",
        "home" => "home",
        "end" => "end",
        "pageup" => "pageup",
        "pagedown" => "pagedown",
        other => return other.to_string(),
    };
    mapped.to_string()
}

/// Returns `true` when `text` can be typed key by key.
///
/// Anything outside ASCII has to go through the clipboard.
pub fn is_typeable(text: &str) -> bool {
    text.is_ascii()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
