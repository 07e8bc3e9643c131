// Trackdance Config
// Chord strings and the optional TOML configuration file

pub mod chord_parser;

#[cfg(feature = "config")]
pub mod parser;

pub use chord_parser::{parse_chord, ChordParseError};

#[cfg(feature = "config")]
pub use parser::{Config, ConfigError, ConfigToml};
