// Trackdance Host Collaborators
// Key, layer and pointing-device interfaces the engine drives

use std::fmt;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::button::{Button, Timestamp};
use crate::keycode::Chord;
use crate::layer::{Layer, LayerState};

/// Keycodes owned by the pointing-device firmware rather than the keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DeviceKey {
    /// Report pointer motion as scroll while held
    DragScroll,
    /// Step to the next DPI setting
    DpiConfig,
    Reboot,
    Bootloader,
}

/// Where a device-key event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// A genuine press or release of this button
    Physical(Button),
    /// Injected while resolving a gesture of this button
    Synthetic(Button),
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Physical(button) => write!(f, "{}", button),
            EventSource::Synthetic(button) => write!(f, "synthetic:{}", button),
        }
    }
}

/// Registers logical keys with the host OS
pub trait KeyEmitter {
    fn emit(&mut self, chord: Chord, pressed: bool);

    /// Press and immediately release
    fn tap(&mut self, chord: Chord) {
        self.emit(chord, true);
        self.emit(chord, false);
    }
}

/// Layer stack storage. Enabling and disabling are idempotent.
pub trait LayerController {
    fn enable(&mut self, layer: Layer);
    fn disable(&mut self, layer: Layer);
    fn is_enabled(&self, layer: Layer) -> bool;
}

/// Processing path for device keycodes (drag scroll, DPI, reset)
pub trait DeviceHandler {
    fn process_device_key(&mut self, key: DeviceKey, pressed: bool, source: EventSource);
}

/// Everything the engine calls into
pub trait Host: KeyEmitter + LayerController + DeviceHandler {}

impl<T: KeyEmitter + LayerController + DeviceHandler> Host for T {}

impl LayerController for LayerState {
    fn enable(&mut self, layer: Layer) {
        LayerState::enable(self, layer)
    }

    fn disable(&mut self, layer: Layer) {
        LayerState::disable(self, layer)
    }

    fn is_enabled(&self, layer: Layer) -> bool {
        LayerState::is_enabled(self, layer)
    }
}

/// A side effect observed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Key { chord: Chord, pressed: bool },
    Layer { layer: Layer, enabled: bool },
    Device { key: DeviceKey, pressed: bool, source: EventSource },
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostAction::Key { chord, pressed } => {
                write!(f, "key {} {}", chord, if *pressed { "down" } else { "up" })
            }
            HostAction::Layer { layer, enabled } => {
                write!(f, "layer {} {}", layer, if *enabled { "on" } else { "off" })
            }
            HostAction::Device {
                key,
                pressed,
                source,
            } => write!(
                f,
                "device {} {} ({})",
                key,
                if *pressed { "down" } else { "up" },
                source
            ),
        }
    }
}

/// Host action stamped with the clock value at which it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEvent {
    pub time: Timestamp,
    pub action: HostAction,
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.action)
    }
}

/// In-memory host that records every side effect in order.
///
/// Used by the replay binary and by tests to check that every press and
/// layer activation is undone.
#[derive(Debug, Default)]
pub struct RecordingHost {
    layers: LayerState,
    events: Vec<HostEvent>,
    held_chords: Vec<Chord>,
    held_devices: Vec<DeviceKey>,
    unmatched_releases: usize,
    now: Timestamp,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clock value stamped on subsequent events
    pub fn set_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Recorded actions without timestamps
    pub fn actions(&self) -> Vec<HostAction> {
        self.events.iter().map(|e| e.action).collect()
    }

    pub fn layers(&self) -> &LayerState {
        &self.layers
    }

    /// Chords currently registered with the host
    pub fn held_chords(&self) -> &[Chord] {
        &self.held_chords
    }

    /// Device keys currently held down
    pub fn held_devices(&self) -> &[DeviceKey] {
        &self.held_devices
    }

    /// Releases that had no matching press
    pub fn unmatched_releases(&self) -> usize {
        self.unmatched_releases
    }

    /// True when nothing is held, no layer above base is on, and every
    /// release matched a press
    pub fn is_settled(&self) -> bool {
        self.held_chords.is_empty()
            && self.held_devices.is_empty()
            && self.layers.highest() == Layer::Base
            && self.unmatched_releases == 0
    }

    fn record(&mut self, action: HostAction) {
        log::trace!("host: {}", action);
        self.events.push(HostEvent {
            time: self.now,
            action,
        });
    }
}

impl KeyEmitter for RecordingHost {
    fn emit(&mut self, chord: Chord, pressed: bool) {
        if pressed {
            self.held_chords.push(chord);
        } else if let Some(pos) = self.held_chords.iter().position(|c| *c == chord) {
            self.held_chords.remove(pos);
        } else {
            self.unmatched_releases += 1;
        }
        self.record(HostAction::Key { chord, pressed });
    }
}

impl LayerController for RecordingHost {
    fn enable(&mut self, layer: Layer) {
        self.layers.enable(layer);
        self.record(HostAction::Layer {
            layer,
            enabled: true,
        });
    }

    fn disable(&mut self, layer: Layer) {
        self.layers.disable(layer);
        self.record(HostAction::Layer {
            layer,
            enabled: false,
        });
    }

    fn is_enabled(&self, layer: Layer) -> bool {
        self.layers.is_enabled(layer)
    }
}

impl DeviceHandler for RecordingHost {
    fn process_device_key(&mut self, key: DeviceKey, pressed: bool, source: EventSource) {
        if pressed {
            self.held_devices.push(key);
        } else if let Some(pos) = self.held_devices.iter().position(|k| *k == key) {
            self.held_devices.remove(pos);
        } else {
            self.unmatched_releases += 1;
        }
        self.record(HostAction::Device {
            key,
            pressed,
            source,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::{BasicKey, Modifier};

    #[test]
    fn test_recording_host_tracks_held_chords() {
        let mut host = RecordingHost::new();
        let chord = Chord::key(BasicKey::Tab).with(Modifier::LGui);
        host.set_time(10);
        host.emit(chord, true);
        assert_eq!(host.held_chords(), &[chord]);
        assert!(!host.is_settled());

        host.set_time(20);
        host.emit(chord, false);
        assert!(host.held_chords().is_empty());
        assert!(host.is_settled());
        assert_eq!(host.events().len(), 2);
        assert_eq!(host.events()[1].time, 20);
    }

    #[test]
    fn test_tap_presses_then_releases() {
        let mut host = RecordingHost::new();
        host.tap(Chord::key(BasicKey::Btn2));
        assert_eq!(
            host.actions(),
            vec![
                HostAction::Key {
                    chord: Chord::key(BasicKey::Btn2),
                    pressed: true
                },
                HostAction::Key {
                    chord: Chord::key(BasicKey::Btn2),
                    pressed: false
                },
            ]
        );
        assert!(host.is_settled());
    }

    #[test]
    fn test_unmatched_release_is_counted() {
        let mut host = RecordingHost::new();
        host.emit(Chord::key(BasicKey::Enter), false);
        assert_eq!(host.unmatched_releases(), 1);
        assert!(!host.is_settled());
    }

    #[test]
    fn test_layers_and_devices() {
        let mut host = RecordingHost::new();
        host.enable(Layer::Raise);
        host.process_device_key(
            DeviceKey::DragScroll,
            true,
            EventSource::Synthetic(Button::Back),
        );
        assert!(host.is_enabled(Layer::Raise));
        assert_eq!(host.held_devices(), &[DeviceKey::DragScroll]);

        host.process_device_key(
            DeviceKey::DragScroll,
            false,
            EventSource::Synthetic(Button::Back),
        );
        host.disable(Layer::Raise);
        assert!(host.is_settled());
    }

    #[test]
    fn test_host_action_display() {
        let action = HostAction::Key {
            chord: Chord::key(BasicKey::Left).with(Modifier::LCtrl),
            pressed: true,
        };
        assert_eq!(action.to_string(), "key Ctrl-Left down");
        let action = HostAction::Device {
            key: DeviceKey::DragScroll,
            pressed: false,
            source: EventSource::Synthetic(Button::Back),
        };
        assert_eq!(action.to_string(), "device drag_scroll up (synthetic:back)");
    }
}
