// Trackdance Layers
// Layer identifiers and a bitmask layer stack

use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Keymap layers, lowest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum Layer {
    Base = 0,
    /// Active while mouse button 1 is latched down
    DragLock = 1,
    /// DPI cycling, held from the right button
    DpiControl = 2,
    /// Drag scroll, horizontal wheel and editing shortcuts, held from Back
    Raise = 3,
    /// Utility shortcuts, held from Forward
    Lower = 4,
    /// Profile toggle, reboot and bootloader
    System = 5,
}

impl Layer {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of enabled layers. The base layer is always on.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerState {
    bits: u32,
}

impl LayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `layer`; enabling twice is harmless
    pub fn enable(&mut self, layer: Layer) {
        self.bits |= layer.bit();
    }

    /// Disable `layer`; disabling twice is harmless
    pub fn disable(&mut self, layer: Layer) {
        self.bits &= !layer.bit();
    }

    pub fn is_enabled(&self, layer: Layer) -> bool {
        layer == Layer::Base || self.bits & layer.bit() != 0
    }

    /// Enabled layers from highest to lowest priority, always ending with
    /// `Base`
    pub fn active_descending(&self) -> impl Iterator<Item = Layer> + '_ {
        Layer::iter().rev().filter(move |l| self.is_enabled(*l))
    }

    /// Highest enabled layer
    pub fn highest(&self) -> Layer {
        self.active_descending().next().unwrap_or(Layer::Base)
    }
}

impl fmt::Debug for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Layer::iter().filter(|l| self.is_enabled(*l)))
            .finish()
    }
}
