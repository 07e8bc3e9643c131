// Trackdance Config Parser - TOML with Serde
// Parses timing, profile and shortcut overrides from TOML files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::chord_parser::{parse_chord, ChordParseError};
use crate::button::DanceKey;
use crate::controller::Controller;
use crate::dispatch::BindingTable;
use crate::keycode::Chord;
use crate::mode::Profile;
use crate::shortcuts::{ProfileChords, Shortcut, ShortcutTable};
use crate::timing::{TimingPolicy, DEFAULT_TAPPING_TERM_MS};

/// Shortest accepted tapping term in milliseconds
pub const MIN_TAPPING_TERM_MS: u64 = 50;

/// Longest accepted tapping term in milliseconds
pub const MAX_TAPPING_TERM_MS: u64 = 2000;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid chord '{input}': {source}")]
    InvalidChord {
        input: String,
        source: ChordParseError,
    },

    #[error("Unknown button: {0}")]
    UnknownButton(String),

    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),

    #[error("Timing value out of range: {0}")]
    TimingOutOfRange(String),
}

/// Root TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub timing: Option<TimingToml>,

    #[serde(default)]
    pub profile: Option<ProfileToml>,

    /// Shortcut overrides keyed by snake_case shortcut name
    #[serde(default)]
    pub shortcuts: BTreeMap<String, ShortcutToml>,
}

/// Tapping terms
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingToml {
    /// Window for keys without an override (milliseconds)
    pub tapping_term_ms: Option<u64>,

    /// Absolute per-key windows (milliseconds), keyed `btn2`/`btn4`/`btn5`
    #[serde(default)]
    pub buttons: BTreeMap<String, u64>,

    /// Per-key eager double tap switch, keyed like `buttons`
    #[serde(default)]
    pub eager_double_tap: BTreeMap<String, bool>,
}

/// Startup profile
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileToml {
    pub default: Profile,
}

/// Chord strings for one shortcut; a missing side keeps the built-in chord
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShortcutToml {
    pub mac: Option<String>,
    pub windows: Option<String>,
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Window for keys without an override (milliseconds)
    pub tapping_term_ms: u64,
    /// Explicit per-key windows (milliseconds)
    pub term_overrides: Vec<(DanceKey, u64)>,
    /// Explicit per-key eager double tap switches
    pub eager_double_tap: Vec<(DanceKey, bool)>,
    /// Profile at startup
    pub profile: Profile,
    /// Shortcuts whose chords differ from the built-in table
    pub shortcuts: Vec<(Shortcut, ProfileChords)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tapping_term_ms: DEFAULT_TAPPING_TERM_MS,
            term_overrides: vec![],
            eager_double_tap: vec![],
            profile: Profile::default(),
            shortcuts: vec![],
        }
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Get the default config path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trackdance").join("config.toml"))
    }

    /// Load from default location (~/.config/trackdance/config.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                return Self::from_toml_path(path);
            }
        }
        // Built-in defaults when no file exists
        Ok(Self::default())
    }

    /// Tapping terms: thumb keys get the usual bonus over the base term
    /// unless overridden explicitly
    pub fn timing_policy(&self) -> TimingPolicy {
        let policy = TimingPolicy::trackball(self.tapping_term_ms);
        self.term_overrides
            .iter()
            .fold(policy, |policy, (key, term)| policy.with_term(*key, *term))
    }

    /// Built-in shortcut table with this config's overrides applied
    pub fn shortcut_table(&self) -> ShortcutTable {
        let mut table = ShortcutTable::default();
        for (shortcut, chords) in &self.shortcuts {
            table.set(*shortcut, *chords);
        }
        table
    }

    /// Built-in bindings with this config's eager double tap switches
    pub fn binding_table(&self) -> BindingTable {
        let mut table = BindingTable::trackball();
        for (key, eager) in &self.eager_double_tap {
            table.set_eager_double_tap(*key, *eager);
        }
        table
    }

    pub fn initial_profile(&self) -> Profile {
        self.profile
    }

    /// Controller configured from this file
    pub fn controller(&self) -> Controller {
        Controller::new(
            &self.timing_policy(),
            self.binding_table(),
            self.shortcut_table(),
        )
        .with_profile(self.profile)
    }
}

impl ConfigToml {
    /// Convert parsed TOML to internal Config structure
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(timing) = &self.timing {
            if let Some(term) = timing.tapping_term_ms {
                config.tapping_term_ms = check_term("tapping_term_ms", term)?;
            }
            for (name, term) in &timing.buttons {
                let key = parse_dance_key(name)?;
                let term = check_term(&format!("buttons.{}", name), *term)?;
                config.term_overrides.push((key, term));
            }
            for (name, eager) in &timing.eager_double_tap {
                config.eager_double_tap.push((parse_dance_key(name)?, *eager));
            }
        }

        if let Some(profile) = &self.profile {
            config.profile = profile.default;
        }

        let defaults = ShortcutTable::default();
        for (name, entry) in &self.shortcuts {
            let shortcut: Shortcut = name
                .parse()
                .map_err(|_| ConfigError::UnknownShortcut(name.clone()))?;
            let builtin = defaults.get(shortcut);
            let chords = ProfileChords::new(
                parse_optional_chord(entry.mac.as_deref(), builtin.mac)?,
                parse_optional_chord(entry.windows.as_deref(), builtin.windows)?,
            );
            log::debug!(
                "shortcut {} overridden: mac {}, windows {}",
                shortcut,
                chords.mac,
                chords.windows
            );
            config.shortcuts.push((shortcut, chords));
        }

        Ok(config)
    }
}

fn check_term(name: &str, term: u64) -> Result<u64, ConfigError> {
    if !(MIN_TAPPING_TERM_MS..=MAX_TAPPING_TERM_MS).contains(&term) {
        return Err(ConfigError::TimingOutOfRange(format!(
            "{} must be {}-{}ms, got {}",
            name, MIN_TAPPING_TERM_MS, MAX_TAPPING_TERM_MS, term
        )));
    }
    Ok(term)
}

fn parse_dance_key(name: &str) -> Result<DanceKey, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::UnknownButton(name.to_string()))
}

fn parse_optional_chord(input: Option<&str>, fallback: Chord) -> Result<Chord, ConfigError> {
    match input {
        Some(input) => parse_chord(input).map_err(|source| ConfigError::InvalidChord {
            input: input.to_string(),
            source,
        }),
        None => Ok(fallback),
    }
}
