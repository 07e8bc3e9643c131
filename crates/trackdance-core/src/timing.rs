// Trackdance Timing Policy
// Per-button tapping terms

use std::collections::HashMap;

use crate::button::DanceKey;

/// Default tapping term in milliseconds
pub const DEFAULT_TAPPING_TERM_MS: u64 = 200;

/// Extra time given to the thumb buttons, which move slower than fingers
pub const THUMB_TAPPING_TERM_BONUS_MS: u64 = 75;

/// Maximum window between related events of one tap-dance key.
///
/// The same window bounds the gap between two taps and the press duration
/// that turns a single press into a hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingPolicy {
    default_term: u64,
    overrides: HashMap<DanceKey, u64>,
}

impl TimingPolicy {
    /// Policy using `default_term` for every key
    pub fn uniform(default_term: u64) -> Self {
        Self {
            default_term,
            overrides: HashMap::new(),
        }
    }

    /// The trackball's stock windows: `Btn2` uses the default term and the
    /// thumb buttons `Btn4`/`Btn5` get a longer one.
    pub fn trackball(default_term: u64) -> Self {
        Self::uniform(default_term)
            .with_term(DanceKey::Btn4, default_term + THUMB_TAPPING_TERM_BONUS_MS)
            .with_term(DanceKey::Btn5, default_term + THUMB_TAPPING_TERM_BONUS_MS)
    }

    /// Override the window of a single key
    pub fn with_term(mut self, key: DanceKey, term: u64) -> Self {
        self.overrides.insert(key, term);
        self
    }

    /// Get the window for `key` in milliseconds
    pub fn term(&self, key: DanceKey) -> u64 {
        self.overrides
            .get(&key)
            .copied()
            .unwrap_or(self.default_term)
    }

    pub fn default_term(&self) -> u64 {
        self.default_term
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self::trackball(DEFAULT_TAPPING_TERM_MS)
    }
}
