// Trackdance Mode State
// Mac / Windows output profile toggle

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Output profile: which OS shortcut convention the device emits
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Mac,
    Windows,
}

impl Profile {
    /// The other profile
    pub fn flipped(self) -> Self {
        match self {
            Profile::Mac => Profile::Windows,
            Profile::Windows => Profile::Mac,
        }
    }
}

/// The device-wide mode flag, read by every profile-dependent dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeState {
    profile: Profile,
}

impl ModeState {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    /// Get the active profile
    pub fn current(&self) -> Profile {
        self.profile
    }

    /// Flip the profile and return the new one
    pub fn toggle(&mut self) -> Profile {
        self.profile = self.profile.flipped();
        log::debug!("profile switched to {}", self.profile);
        self.profile
    }
}
