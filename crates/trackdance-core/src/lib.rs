// Trackdance Core Library
// Tap-dance gesture engine for a five-button trackball

pub mod button;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod event;
pub mod gesture;
pub mod host;
pub mod inject;
pub mod keycode;
pub mod keymap;
pub mod layer;
pub mod mode;
pub mod shortcuts;
pub mod timing;

pub use button::{Button, ButtonEvent, DanceKey, Timestamp};
pub use config::{parse_chord, ChordParseError};
pub use controller::Controller;
pub use dispatch::{ActionBinding, ActionDispatcher, BindingError, BindingTable, Effect, KeySource};
pub use event::{parse_script, Replayer, ScriptAction, ScriptError, ScriptEvent};
pub use gesture::{ButtonGesture, Classification, GestureClassifier, Resolution};
pub use host::{
    DeviceHandler, DeviceKey, EventSource, Host, HostAction, HostEvent, KeyEmitter,
    LayerController, RecordingHost,
};
pub use inject::SyntheticInjector;
pub use keycode::{BasicKey, Chord, Modifier, Mods};
pub use keymap::{CustomKey, Keycode, Keymap};
pub use layer::{Layer, LayerState};
pub use mode::{ModeState, Profile};
pub use shortcuts::{ProfileChords, Shortcut, ShortcutTable};
pub use timing::{TimingPolicy, DEFAULT_TAPPING_TERM_MS, THUMB_TAPPING_TERM_BONUS_MS};

#[cfg(feature = "config")]
pub use config::{Config, ConfigError};
