// Trackdance Keymap
// Per-layer keycodes of the five buttons and layered lookup

use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::button::{Button, DanceKey};
use crate::host::{DeviceKey, LayerController};
use crate::keycode::{BasicKey, Chord};
use crate::layer::Layer;
use crate::shortcuts::Shortcut;

/// Keycodes handled by the dispatcher rather than sent as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CustomKey {
    /// Latch mouse button 1 down and enter the drag-lock layer
    DragLockOn,
    /// Release the latch on key-up
    DragLockOff,
    /// Switch between the Mac and Windows profiles
    ToggleProfile,
    ShowWindows,
    ShowDesktop,
    Screenshot,
    Cut,
    Copy,
    Paste,
}

impl CustomKey {
    /// The profile-dependent shortcut this key sends, if any
    pub fn shortcut(self) -> Option<Shortcut> {
        match self {
            CustomKey::ShowWindows => Some(Shortcut::ShowWindows),
            CustomKey::ShowDesktop => Some(Shortcut::ShowDesktop),
            CustomKey::Screenshot => Some(Shortcut::Screenshot),
            CustomKey::Cut => Some(Shortcut::Cut),
            CustomKey::Copy => Some(Shortcut::Copy),
            CustomKey::Paste => Some(Shortcut::Paste),
            CustomKey::DragLockOn | CustomKey::DragLockOff | CustomKey::ToggleProfile => None,
        }
    }
}

/// One keymap cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keycode {
    /// Does nothing and blocks lower layers
    No,
    /// Falls through to the next enabled layer below
    Transparent,
    Basic(Chord),
    TapDance(DanceKey),
    /// Layer enabled while held
    Momentary(Layer),
    Custom(CustomKey),
    Device(DeviceKey),
}

impl From<BasicKey> for Keycode {
    fn from(key: BasicKey) -> Self {
        Keycode::Basic(Chord::key(key))
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keycode::No => write!(f, "XXXXXXX"),
            Keycode::Transparent => write!(f, "_______"),
            Keycode::Basic(chord) => write!(f, "{}", chord),
            Keycode::TapDance(key) => write!(f, "TD({})", key),
            Keycode::Momentary(layer) => write!(f, "MO({})", layer),
            Keycode::Custom(key) => write!(f, "{}", key),
            Keycode::Device(key) => write!(f, "{}", key),
        }
    }
}

type LayerRow = [Keycode; Button::COUNT];

/// Keycodes of every button on every layer
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap {
    layers: [LayerRow; Layer::COUNT],
}

impl Keymap {
    /// Keymap where every layer but `Base` is transparent
    pub fn new(base: LayerRow) -> Self {
        let mut layers = [[Keycode::Transparent; Button::COUNT]; Layer::COUNT];
        layers[Layer::Base.index()] = base;
        Self { layers }
    }

    /// Replace the row of `layer`
    pub fn with_layer(mut self, layer: Layer, row: LayerRow) -> Self {
        self.layers[layer.index()] = row;
        self
    }

    /// Keycode stored at `button` on `layer`, without fall-through
    pub fn cell(&self, layer: Layer, button: Button) -> Keycode {
        self.layers[layer.index()][button.index()]
    }

    /// Resolve `button` through the enabled layers, highest first.
    /// Transparent cells fall through; a transparent base cell yields `No`.
    pub fn lookup<L: LayerController + ?Sized>(&self, layers: &L, button: Button) -> Keycode {
        let resolved = Layer::iter()
            .rev()
            .filter(|layer| *layer == Layer::Base || layers.is_enabled(*layer))
            .map(|layer| self.cell(layer, button))
            .find(|keycode| *keycode != Keycode::Transparent)
            .unwrap_or(Keycode::No);
        log::trace!("lookup {} -> {}", button, resolved);
        resolved
    }

    /// The trackball layout:
    ///
    /// | layer       | left          | middle        | right         | back   | forward   |
    /// |-------------|---------------|---------------|---------------|--------|-----------|
    /// | base        | Btn1          | show windows  | TD(btn2)      | TD(btn4) | TD(btn5) |
    /// | drag_lock   | drag lock off | _             | _             | _      | _         |
    /// | dpi_control | X             | DPI config    | _             | X      | X         |
    /// | raise       | drag lock on  | show desktop  | cut           | _      | MO(system) |
    /// | lower       | Btn3          | screenshot    | copy          | paste  | _         |
    /// | system      | reboot        | bootloader    | toggle profile | _     | _         |
    pub fn trackball() -> Self {
        use Keycode::{No, Transparent as Trns};

        Keymap::new([
            BasicKey::Btn1.into(),
            Keycode::Custom(CustomKey::ShowWindows),
            Keycode::TapDance(DanceKey::Btn2),
            Keycode::TapDance(DanceKey::Btn4),
            Keycode::TapDance(DanceKey::Btn5),
        ])
        .with_layer(
            Layer::DragLock,
            [Keycode::Custom(CustomKey::DragLockOff), Trns, Trns, Trns, Trns],
        )
        .with_layer(
            Layer::DpiControl,
            [No, Keycode::Device(DeviceKey::DpiConfig), Trns, No, No],
        )
        .with_layer(
            Layer::Raise,
            [
                Keycode::Custom(CustomKey::DragLockOn),
                Keycode::Custom(CustomKey::ShowDesktop),
                Keycode::Custom(CustomKey::Cut),
                Trns,
                Keycode::Momentary(Layer::System),
            ],
        )
        .with_layer(
            Layer::Lower,
            [
                BasicKey::Btn3.into(),
                Keycode::Custom(CustomKey::Screenshot),
                Keycode::Custom(CustomKey::Copy),
                Keycode::Custom(CustomKey::Paste),
                Trns,
            ],
        )
        .with_layer(
            Layer::System,
            [
                Keycode::Device(DeviceKey::Reboot),
                Keycode::Device(DeviceKey::Bootloader),
                Keycode::Custom(CustomKey::ToggleProfile),
                Trns,
                Trns,
            ],
        )
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::trackball()
    }
}
