// Trackdance Config - Chord String Parser
// Parses chord strings like "Cmd-Shift-4" into a modifier set and key

use std::str::FromStr;

use crate::keycode::{BasicKey, Chord, Modifier, Mods};

/// Errors that can occur during chord parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    /// Empty input string
    EmptyInput,
    /// Key name not recognized
    UnknownKey(String),
    /// Modifier alias not recognized
    UnknownModifier(String),
    /// Input ends with hyphen (e.g., "Ctrl-")
    TrailingHyphen,
}

impl std::fmt::Display for ChordParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChordParseError::EmptyInput => write!(f, "chord string cannot be empty"),
            ChordParseError::UnknownKey(name) => write!(f, "unknown key name: '{}'", name),
            ChordParseError::UnknownModifier(name) => write!(f, "unknown modifier: '{}'", name),
            ChordParseError::TrailingHyphen => write!(f, "chord string cannot end with hyphen"),
        }
    }
}

impl std::error::Error for ChordParseError {}

/// Parse a chord string like "Ctrl-Gui-Left" into modifiers and key.
///
/// The last hyphen-separated part is the key, everything before it a
/// modifier alias. Repeated modifiers collapse.
///
/// # Examples
/// ```
/// use trackdance_core::config::parse_chord;
/// use trackdance_core::{BasicKey, Chord, Modifier};
/// let chord = parse_chord("Cmd-C").unwrap();
/// assert_eq!(chord, Chord::key(BasicKey::C).with(Modifier::LGui));
/// ```
pub fn parse_chord(exp: &str) -> Result<Chord, ChordParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(ChordParseError::EmptyInput);
    }

    if trimmed.ends_with('-') {
        return Err(ChordParseError::TrailingHyphen);
    }

    let mut parts: Vec<&str> = trimmed.split('-').collect();
    let key_str = parts.pop().ok_or(ChordParseError::EmptyInput)?;
    let key = BasicKey::from_name(key_str)
        .ok_or_else(|| ChordParseError::UnknownKey(key_str.to_string()))?;

    let mut mods = Mods::NONE;
    for alias in parts {
        let modifier = Modifier::from_alias(alias)
            .ok_or_else(|| ChordParseError::UnknownModifier(alias.to_string()))?;
        mods = mods.with(modifier);
    }

    Ok(Chord::new(mods, key))
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}
