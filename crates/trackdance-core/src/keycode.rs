// Trackdance Keycodes
// Basic HID usages, modifiers and modifier+key chords

use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A basic HID usage the device can report: keyboard keys, mouse buttons
/// and wheel directions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BasicKey {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    #[strum(to_string = "1")]
    N1,
    #[strum(to_string = "2")]
    N2,
    #[strum(to_string = "3")]
    N3,
    #[strum(to_string = "4")]
    N4,
    #[strum(to_string = "5")]
    N5,
    #[strum(to_string = "6")]
    N6,
    #[strum(to_string = "7")]
    N7,
    #[strum(to_string = "8")]
    N8,
    #[strum(to_string = "9")]
    N9,
    #[strum(to_string = "0")]
    N0,
    Enter,
    #[strum(to_string = "Esc")]
    Escape,
    Backspace,
    Tab,
    Space,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Btn1,
    Btn2,
    Btn3,
    Btn4,
    Btn5,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
}

impl BasicKey {
    /// Returns true for mouse buttons and wheel directions
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            BasicKey::Btn1
                | BasicKey::Btn2
                | BasicKey::Btn3
                | BasicKey::Btn4
                | BasicKey::Btn5
                | BasicKey::WheelUp
                | BasicKey::WheelDown
                | BasicKey::WheelLeft
                | BasicKey::WheelRight
        )
    }

    /// Look up a key by name, accepting an optional QMK-style `KC_` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let bare = trimmed
            .strip_prefix("KC_")
            .or_else(|| trimmed.strip_prefix("kc_"))
            .unwrap_or(trimmed);
        bare.parse().ok()
    }
}

/// One of the eight HID modifier keys, in report bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u8)]
pub enum Modifier {
    LCtrl = 0,
    LShift = 1,
    LAlt = 2,
    LGui = 3,
    RCtrl = 4,
    RShift = 5,
    RAlt = 6,
    RGui = 7,
}

impl Modifier {
    /// Bit of this modifier in a HID modifier byte
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Resolve a modifier alias such as `Ctrl`, `Cmd`, `Opt` or `RShift`.
    ///
    /// Side-less aliases map to the left-hand modifier, the way QMK's
    /// `LCTL()`/`LGUI()` wrappers do. Matching is case-insensitive.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let modifier = match alias.to_ascii_lowercase().as_str() {
            "ctrl" | "c" | "control" | "lctrl" | "lc" | "lctl" => Modifier::LCtrl,
            "rctrl" | "rc" | "rctl" => Modifier::RCtrl,
            "shift" | "s" | "lshift" | "lsft" => Modifier::LShift,
            "rshift" | "rsft" => Modifier::RShift,
            "alt" | "a" | "opt" | "option" | "lalt" | "lopt" => Modifier::LAlt,
            "ralt" | "ropt" | "altgr" => Modifier::RAlt,
            "gui" | "g" | "cmd" | "command" | "super" | "win" | "meta" | "lgui" | "lcmd"
            | "lwin" => Modifier::LGui,
            "rgui" | "rcmd" | "rwin" => Modifier::RGui,
            _ => return None,
        };
        Some(modifier)
    }

    /// Canonical alias used when displaying chords
    pub fn primary_alias(self) -> &'static str {
        match self {
            Modifier::LCtrl => "Ctrl",
            Modifier::LShift => "Shift",
            Modifier::LAlt => "Alt",
            Modifier::LGui => "Gui",
            Modifier::RCtrl => "RCtrl",
            Modifier::RShift => "RShift",
            Modifier::RAlt => "RAlt",
            Modifier::RGui => "RGui",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_alias())
    }
}

/// A set of modifiers, stored as a HID modifier byte
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Mods(u8);

impl Mods {
    pub const NONE: Mods = Mods(0);

    /// Return a copy with `modifier` added
    pub fn with(self, modifier: Modifier) -> Self {
        Mods(self.0 | modifier.bit())
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the contained modifiers in report bit order
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Modifier> for Mods {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Mods::NONE, Mods::with)
    }
}

impl fmt::Debug for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A key together with the modifiers held around it.
///
/// This is the unit the key emitter registers with the host, the
/// equivalent of a 16-bit QMK keycode such as `LGUI(KC_TAB)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    mods: Mods,
    key: BasicKey,
}

impl Chord {
    /// Create a chord from a modifier set and a key
    pub fn new(mods: Mods, key: BasicKey) -> Self {
        Self { mods, key }
    }

    /// A bare key with no modifiers
    pub fn key(key: BasicKey) -> Self {
        Self {
            mods: Mods::NONE,
            key,
        }
    }

    /// Return a copy with `modifier` added
    pub fn with(self, modifier: Modifier) -> Self {
        Self {
            mods: self.mods.with(modifier),
            key: self.key,
        }
    }

    pub fn mods(&self) -> Mods {
        self.mods
    }

    pub fn basic(&self) -> BasicKey {
        self.key
    }
}

impl From<BasicKey> for Chord {
    fn from(key: BasicKey) -> Self {
        Chord::key(key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in self.mods.iter() {
            write!(f, "{}-", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}
