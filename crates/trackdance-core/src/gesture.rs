// Trackdance Gesture Classifier
// Per-key state machine separating taps, double taps and holds

use std::fmt;

use crate::button::{Button, DanceKey, Timestamp};

/// Outcome of a tap-dance sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// No sequence in progress
    #[default]
    None,
    /// More contacts than any binding handles
    Unknown,
    SingleTap,
    DoubleTap,
    SingleHold,
}

impl Classification {
    /// Classify a sequence from its contact count and whether the button is
    /// still down
    pub fn classify(tap_count: u8, pressed: bool) -> Self {
        match tap_count {
            0 => Classification::None,
            1 if pressed => Classification::SingleHold,
            1 => Classification::SingleTap,
            2 => Classification::DoubleTap,
            _ => Classification::Unknown,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::None => write!(f, "none"),
            Classification::Unknown => write!(f, "unknown"),
            Classification::SingleTap => write!(f, "single-tap"),
            Classification::DoubleTap => write!(f, "double-tap"),
            Classification::SingleHold => write!(f, "single-hold"),
        }
    }
}

/// Tap-dance bookkeeping of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonGesture {
    tap_count: u8,
    pressed: bool,
    classification: Classification,
}

impl ButtonGesture {
    pub fn tap_count(&self) -> u8 {
        self.tap_count
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Provisional classification while counting, final once resolved,
    /// `None` when idle
    pub fn classification(&self) -> Classification {
        self.classification
    }
}

/// What a classifier call produced, consumed immediately by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing in progress, or the event was ignored
    None,
    /// Sequence still counting
    Pending,
    /// Resolved while the button is held; a `Reset` follows on release
    Resolved(Classification),
    /// Resolved with the button already up; finish and reset back to back
    ResolvedAndReset(Classification),
    /// Sequence torn down on release, carrying the classification it
    /// resolved with
    Reset(Classification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Counting { deadline: Timestamp },
    Resolved,
}

/// Gesture state machine for one tap-dance key.
///
/// `Idle -> Counting -> Resolved -> Idle`. The window is re-armed on every
/// press; while counting, the classifier resolves on window expiry, on
/// interruption by another button, or (with eager double taps) the moment
/// the second press lands.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    key: DanceKey,
    term: u64,
    eager_double_tap: bool,
    gesture: ButtonGesture,
    phase: Phase,
    /// Button that started the most recent sequence
    origin: Option<Button>,
}

impl GestureClassifier {
    /// Create an idle classifier with a window of `term` milliseconds
    pub fn new(key: DanceKey, term: u64) -> Self {
        Self {
            key,
            term,
            eager_double_tap: true,
            gesture: ButtonGesture::default(),
            phase: Phase::Idle,
            origin: None,
        }
    }

    /// Whether a second press resolves `DoubleTap` immediately instead of
    /// waiting for the window to close
    pub fn with_eager_double_tap(mut self, eager: bool) -> Self {
        self.eager_double_tap = eager;
        self
    }

    pub fn key(&self) -> DanceKey {
        self.key
    }

    pub fn term(&self) -> u64 {
        self.term
    }

    pub fn gesture(&self) -> &ButtonGesture {
        &self.gesture
    }

    pub fn origin(&self) -> Option<Button> {
        self.origin
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// True while the sequence can still change its classification
    pub fn is_counting(&self) -> bool {
        matches!(self.phase, Phase::Counting { .. })
    }

    /// Deadline of the current window, if counting
    pub fn deadline(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Counting { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Handle a press of the key at `now`
    pub fn on_press(&mut self, origin: Button, now: Timestamp) -> Resolution {
        match self.phase {
            Phase::Idle => {
                self.gesture = ButtonGesture {
                    tap_count: 1,
                    pressed: true,
                    classification: Classification::classify(1, true),
                };
                self.origin = Some(origin);
                self.phase = Phase::Counting {
                    deadline: now.saturating_add(self.term),
                };
                log::debug!("{}: sequence started at {}", self.key, now);
                Resolution::Pending
            }
            Phase::Counting { .. } if self.gesture.pressed => {
                log::warn!("{}: press while already down at {}, ignored", self.key, now);
                Resolution::None
            }
            Phase::Counting { .. } => {
                self.gesture.tap_count = self.gesture.tap_count.saturating_add(1);
                self.gesture.pressed = true;
                self.gesture.classification =
                    Classification::classify(self.gesture.tap_count, true);

                if self.eager_double_tap && self.gesture.tap_count == 2 {
                    log::debug!("{}: second press at {}, resolving now", self.key, now);
                    return self.resolve();
                }

                self.phase = Phase::Counting {
                    deadline: now.saturating_add(self.term),
                };
                Resolution::Pending
            }
            Phase::Resolved => {
                log::warn!("{}: press after resolution at {}, ignored", self.key, now);
                Resolution::None
            }
        }
    }

    /// Handle a release of the key at `now`
    pub fn on_release(&mut self, now: Timestamp) -> Resolution {
        match self.phase {
            Phase::Idle => {
                log::debug!("{}: release without a sequence at {}, ignored", self.key, now);
                Resolution::None
            }
            Phase::Counting { .. } if !self.gesture.pressed => {
                log::warn!("{}: release while already up at {}, ignored", self.key, now);
                Resolution::Pending
            }
            Phase::Counting { .. } => {
                self.gesture.pressed = false;
                self.gesture.classification =
                    Classification::classify(self.gesture.tap_count, false);
                Resolution::Pending
            }
            Phase::Resolved => {
                let classification = self.gesture.classification;
                self.clear();
                log::debug!("{}: reset {} at {}", self.key, classification, now);
                Resolution::Reset(classification)
            }
        }
    }

    /// Resolve if the window closed at or before `now`
    pub fn poll(&mut self, now: Timestamp) -> Resolution {
        match self.phase {
            Phase::Counting { deadline } if now >= deadline => {
                log::debug!("{}: window closed at {} (deadline {})", self.key, now, deadline);
                self.resolve()
            }
            Phase::Counting { .. } => Resolution::Pending,
            _ => Resolution::None,
        }
    }

    /// Resolve immediately because another button took over
    pub fn interrupt(&mut self) -> Resolution {
        if self.is_counting() {
            log::debug!("{}: interrupted", self.key);
            self.resolve()
        } else {
            Resolution::None
        }
    }

    fn resolve(&mut self) -> Resolution {
        let classification =
            Classification::classify(self.gesture.tap_count, self.gesture.pressed);
        self.gesture.classification = classification;

        if self.gesture.pressed {
            self.phase = Phase::Resolved;
            Resolution::Resolved(classification)
        } else {
            self.clear();
            Resolution::ResolvedAndReset(classification)
        }
    }

    fn clear(&mut self) {
        self.gesture = ButtonGesture::default();
        self.phase = Phase::Idle;
    }
}
