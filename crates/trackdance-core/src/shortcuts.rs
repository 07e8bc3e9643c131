// Trackdance Shortcut Table
// Semantic actions and their per-profile chords

use indexmap::IndexMap;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::keycode::{BasicKey, Chord, Modifier};
use crate::mode::Profile;

/// An OS-level action whose shortcut depends on the active profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Shortcut {
    /// Move one desktop/space to the left
    DesktopLeft,
    /// Move one desktop/space to the right
    DesktopRight,
    /// Mission Control / Task View
    ShowWindows,
    ShowDesktop,
    /// Region screenshot
    Screenshot,
    Cut,
    Copy,
    Paste,
}

/// Chords for one shortcut under each profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileChords {
    pub mac: Chord,
    pub windows: Chord,
}

impl ProfileChords {
    pub fn new(mac: Chord, windows: Chord) -> Self {
        Self { mac, windows }
    }

    /// Pick the chord for `profile`
    pub fn for_profile(&self, profile: Profile) -> Chord {
        match profile {
            Profile::Mac => self.mac,
            Profile::Windows => self.windows,
        }
    }
}

/// Static mapping from semantic action to per-profile chords
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutTable {
    entries: IndexMap<Shortcut, ProfileChords>,
}

impl ShortcutTable {
    /// Get the chords for `shortcut`
    pub fn get(&self, shortcut: Shortcut) -> ProfileChords {
        // Every Shortcut is populated by Default and overrides only replace
        self.entries[&shortcut]
    }

    /// Get the chord `shortcut` emits under `profile`
    pub fn chord(&self, shortcut: Shortcut, profile: Profile) -> Chord {
        self.get(shortcut).for_profile(profile)
    }

    /// Replace the chords of one shortcut
    pub fn set(&mut self, shortcut: Shortcut, chords: ProfileChords) {
        self.entries.insert(shortcut, chords);
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Shortcut, ProfileChords)> + '_ {
        self.entries.iter().map(|(s, c)| (*s, *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ShortcutTable {
    fn default() -> Self {
        use BasicKey as K;
        use Modifier::{LCtrl, LGui, LShift};

        let defaults = |shortcut: Shortcut| match shortcut {
            Shortcut::DesktopLeft => ProfileChords::new(
                Chord::key(K::Left).with(LCtrl),
                Chord::key(K::Left).with(LCtrl).with(LGui),
            ),
            Shortcut::DesktopRight => ProfileChords::new(
                Chord::key(K::Right).with(LCtrl),
                Chord::key(K::Right).with(LCtrl).with(LGui),
            ),
            Shortcut::ShowWindows => ProfileChords::new(
                Chord::key(K::Up).with(LCtrl),
                Chord::key(K::Tab).with(LGui),
            ),
            Shortcut::ShowDesktop => {
                ProfileChords::new(Chord::key(K::F11), Chord::key(K::D).with(LGui))
            }
            Shortcut::Screenshot => ProfileChords::new(
                Chord::key(K::N4).with(LGui).with(LShift),
                Chord::key(K::S).with(LGui).with(LShift),
            ),
            Shortcut::Cut => {
                ProfileChords::new(Chord::key(K::X).with(LGui), Chord::key(K::X).with(LCtrl))
            }
            Shortcut::Copy => {
                ProfileChords::new(Chord::key(K::C).with(LGui), Chord::key(K::C).with(LCtrl))
            }
            Shortcut::Paste => {
                ProfileChords::new(Chord::key(K::V).with(LGui), Chord::key(K::V).with(LCtrl))
            }
        };

        Self {
            entries: Shortcut::iter().map(|s| (s, defaults(s))).collect(),
        }
    }
}
