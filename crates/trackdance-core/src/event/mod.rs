// Trackdance Event Handling
// Timed event scripts and the simulated scan loop

pub mod replay;
pub mod script;

pub use replay::{Replayer, DEFAULT_SCAN_INTERVAL_MS};
pub use script::{parse_line, parse_script, ScriptAction, ScriptError, ScriptErrorKind, ScriptEvent};
