// Trackdance Buttons
// Physical buttons, tap-dance keys and the debounced event stream

use std::fmt;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Milliseconds on the device's monotonic clock
pub type Timestamp = u64;

/// The five physical buttons, in layout order.
///
/// `Left` is the main button under the index finger, `Middle` the small
/// button next to it, `Right` the ring-finger button and `Back`/`Forward`
/// the two thumb buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum Button {
    Left = 0,
    Middle = 1,
    Right = 2,
    Back = 3,
    Forward = 4,
}

impl Button {
    /// Number of physical buttons
    pub const COUNT: usize = 5;

    /// Position of this button in the layout (and in per-button arrays)
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The buttons overloaded with tap-dance behaviour, named after the mouse
/// button they report on a single tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum DanceKey {
    Btn2 = 0,
    Btn4 = 1,
    Btn5 = 2,
}

impl DanceKey {
    /// Number of tap-dance keys
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A debounced press or release of one physical button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    pub pressed: bool,
    pub time: Timestamp,
}

impl ButtonEvent {
    pub fn press(button: Button, time: Timestamp) -> Self {
        Self {
            button,
            pressed: true,
            time,
        }
    }

    pub fn release(button: Button, time: Timestamp) -> Self {
        Self {
            button,
            pressed: false,
            time,
        }
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.pressed { "press" } else { "release" };
        write!(f, "{} {} {}", self.time, action, self.button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_button_count_matches_variants() {
        assert_eq!(Button::iter().count(), Button::COUNT);
        assert_eq!(DanceKey::iter().count(), DanceKey::COUNT);
    }

    #[test]
    fn test_button_indices_follow_layout() {
        let indices: Vec<usize> = Button::iter().map(Button::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_button_names() {
        assert_eq!("forward".parse::<Button>(), Ok(Button::Forward));
        assert_eq!("Back".parse::<Button>(), Ok(Button::Back));
        assert_eq!(Button::Middle.to_string(), "middle");
        assert_eq!("btn4".parse::<DanceKey>(), Ok(DanceKey::Btn4));
        assert!("btn3".parse::<DanceKey>().is_err());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(ButtonEvent::press(Button::Right, 120).to_string(), "120 press right");
        assert_eq!(ButtonEvent::release(Button::Left, 7).to_string(), "7 release left");
    }
}
