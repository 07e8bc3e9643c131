// Trackdance Controller
// Routes button events through the keymap, classifiers and dispatcher

use crate::button::{Button, ButtonEvent, DanceKey, Timestamp};
use crate::dispatch::{ActionDispatcher, BindingTable};
use crate::gesture::{ButtonGesture, GestureClassifier, Resolution};
use crate::host::Host;
use crate::keycode::{BasicKey, Chord};
use crate::keymap::{Keycode, Keymap};
use crate::layer::Layer;
use crate::mode::{ModeState, Profile};
use crate::shortcuts::ShortcutTable;
use crate::timing::TimingPolicy;

const DANCE_KEYS: [DanceKey; DanceKey::COUNT] = [DanceKey::Btn2, DanceKey::Btn4, DanceKey::Btn5];

/// The engine's context object.
///
/// Owns the three gesture classifiers, the mode flag, the dispatcher and
/// the keymap. The host is borrowed for the duration of each call.
#[derive(Debug, Clone)]
pub struct Controller {
    classifiers: [GestureClassifier; DanceKey::COUNT],
    mode: ModeState,
    dispatcher: ActionDispatcher,
    keymap: Keymap,
    /// Keycode each held button resolved to when it was pressed
    pressed: [Option<Keycode>; Button::COUNT],
}

impl Controller {
    pub fn new(timing: &TimingPolicy, bindings: BindingTable, shortcuts: ShortcutTable) -> Self {
        let classifiers = DANCE_KEYS.map(|key| {
            GestureClassifier::new(key, timing.term(key))
                .with_eager_double_tap(bindings.eager_double_tap(key))
        });

        Self {
            classifiers,
            mode: ModeState::default(),
            dispatcher: ActionDispatcher::new(bindings, shortcuts),
            keymap: Keymap::trackball(),
            pressed: [None; Button::COUNT],
        }
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Set the profile in effect at startup
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.mode = ModeState::new(profile);
        self
    }

    pub fn current_mode(&self) -> Profile {
        self.mode.current()
    }

    /// Flip the output profile; held shortcuts still release what they
    /// pressed
    pub fn toggle_mode(&mut self) -> Profile {
        self.mode.toggle()
    }

    pub fn gesture(&self, key: DanceKey) -> &ButtonGesture {
        self.classifiers[key.index()].gesture()
    }

    pub fn classifier(&self, key: DanceKey) -> &GestureClassifier {
        &self.classifiers[key.index()]
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Earliest window deadline among counting classifiers
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.classifiers.iter().filter_map(|c| c.deadline()).min()
    }

    /// Number of classifiers with an open window
    pub fn counting(&self) -> usize {
        self.classifiers.iter().filter(|c| c.is_counting()).count()
    }

    /// No gesture in progress and no button held
    pub fn is_idle(&self) -> bool {
        self.classifiers.iter().all(GestureClassifier::is_idle)
            && self.pressed.iter().all(Option::is_none)
    }

    /// Feed one debounced button event
    pub fn on_event<H: Host + ?Sized>(&mut self, host: &mut H, event: ButtonEvent) {
        log::debug!("event {}", event);
        // Windows that closed before this event expire first, each at its
        // own deadline
        self.expire(host, event.time, false);

        if event.pressed {
            self.press(host, event.button, event.time);
        } else {
            self.release(host, event.button, event.time);
        }
    }

    /// Scan tick: resolve every window whose deadline is at or before `now`
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, now: Timestamp) {
        self.expire(host, now, true);
    }

    /// Encoder detent. Returns false when the controller consumed it
    /// (horizontal scroll while Raise is on), true when the host should
    /// report its default vertical scroll.
    pub fn on_encoder<H: Host + ?Sized>(&mut self, host: &mut H, clockwise: bool) -> bool {
        if !host.is_enabled(Layer::Raise) {
            return true;
        }
        let wheel = if clockwise {
            BasicKey::WheelLeft
        } else {
            BasicKey::WheelRight
        };
        log::debug!("encoder {} -> {}", if clockwise { "cw" } else { "ccw" }, wheel);
        host.tap(Chord::key(wheel));
        false
    }

    fn press<H: Host + ?Sized>(&mut self, host: &mut H, button: Button, now: Timestamp) {
        // A press landing exactly on a deadline starts a new sequence
        self.expire(host, now, true);

        if self.pressed[button.index()].is_some() {
            log::warn!("{} pressed twice without release at {}, ignored", button, now);
            return;
        }

        if let Keycode::TapDance(key) = self.keymap.lookup(&*host, button) {
            if self.classifiers[key.index()].is_counting() {
                self.press_dance(host, button, key, now);
                return;
            }
        }

        self.interrupt_all(host);

        // Interrupted holds may have enabled a layer
        let keycode = self.keymap.lookup(&*host, button);
        log::debug!("{} -> {}", button, keycode);

        match keycode {
            Keycode::TapDance(key) => self.press_dance(host, button, key, now),
            other => {
                self.pressed[button.index()] = Some(other);
                self.dispatcher
                    .process_record(host, &mut self.mode, button, other, true);
            }
        }
    }

    /// Press a tap-dance key. The keycode is only cached when the
    /// classifier took the press, so the release of an ignored press
    /// cannot reset another button's sequence.
    fn press_dance<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        button: Button,
        key: DanceKey,
        now: Timestamp,
    ) {
        let resolution = self.classifiers[key.index()].on_press(button, now);
        if resolution == Resolution::None {
            log::warn!("{} press ignored by {} at {}", button, key, now);
            return;
        }
        self.pressed[button.index()] = Some(Keycode::TapDance(key));
        self.settle(host, key, resolution);
    }

    fn release<H: Host + ?Sized>(&mut self, host: &mut H, button: Button, now: Timestamp) {
        let Some(keycode) = self.pressed[button.index()].take() else {
            log::warn!("{} released without press at {}, ignored", button, now);
            return;
        };

        match keycode {
            Keycode::TapDance(key) => {
                let resolution = self.classifiers[key.index()].on_release(now);
                self.settle(host, key, resolution);
            }
            other => self
                .dispatcher
                .process_record(host, &mut self.mode, button, other, false),
        }

        // A release exactly on the deadline still counts as a tap
        self.expire(host, now, true);
    }

    /// Poll classifiers whose deadline is before `now` (or at it when
    /// `inclusive`), oldest deadline first
    fn expire<H: Host + ?Sized>(&mut self, host: &mut H, now: Timestamp, inclusive: bool) {
        loop {
            let due = DANCE_KEYS
                .iter()
                .filter_map(|key| {
                    let deadline = self.classifiers[key.index()].deadline()?;
                    let expired = deadline < now || (inclusive && deadline == now);
                    expired.then_some((*key, deadline))
                })
                .min_by_key(|(_, deadline)| *deadline);

            let Some((key, deadline)) = due else {
                break;
            };
            let resolution = self.classifiers[key.index()].poll(deadline);
            self.settle(host, key, resolution);
        }
    }

    fn interrupt_all<H: Host + ?Sized>(&mut self, host: &mut H) {
        for key in DANCE_KEYS {
            let resolution = self.classifiers[key.index()].interrupt();
            self.settle(host, key, resolution);
        }
    }

    /// Dispatch a classifier result.
    ///
    /// A press outside the counting sequence interrupts every classifier
    /// before a new sequence starts, so at most one classifier counts at a
    /// time and a resolution never leaves another sequence to interrupt.
    fn settle<H: Host + ?Sized>(&mut self, host: &mut H, key: DanceKey, resolution: Resolution) {
        let classification = match resolution {
            Resolution::None | Resolution::Pending => return,
            Resolution::Resolved(c) | Resolution::ResolvedAndReset(c) | Resolution::Reset(c) => c,
        };
        let Some(origin) = self.classifiers[key.index()].origin() else {
            log::warn!("{} resolved without an origin button", key);
            return;
        };
        let profile = self.mode.current();

        if matches!(
            resolution,
            Resolution::Resolved(_) | Resolution::ResolvedAndReset(_)
        ) {
            self.dispatcher
                .finish(host, profile, origin, key, classification);
        }
        if matches!(
            resolution,
            Resolution::ResolvedAndReset(_) | Resolution::Reset(_)
        ) {
            self.dispatcher
                .reset(host, profile, origin, key, classification);
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(
            &TimingPolicy::default(),
            BindingTable::default(),
            ShortcutTable::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Classification;
    use crate::host::{HostAction, LayerController, RecordingHost};

    fn key(basic: BasicKey, pressed: bool) -> HostAction {
        HostAction::Key {
            chord: Chord::key(basic),
            pressed,
        }
    }

    fn feed(controller: &mut Controller, host: &mut RecordingHost, event: ButtonEvent) {
        host.set_time(event.time);
        controller.on_event(host, event);
    }

    #[test]
    fn test_plain_button_passes_through() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Left, 0));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Left, 30));
        assert_eq!(
            host.actions(),
            vec![key(BasicKey::Btn1, true), key(BasicKey::Btn1, false)]
        );
        assert!(controller.is_idle());
    }

    #[test]
    fn test_single_tap_waits_for_window() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 50));
        assert!(host.events().is_empty());
        assert_eq!(controller.next_deadline(), Some(200));

        controller.tick(&mut host, 199);
        assert!(host.events().is_empty());
        controller.tick(&mut host, 200);
        assert_eq!(
            host.actions(),
            vec![key(BasicKey::Btn2, true), key(BasicKey::Btn2, false)]
        );
        assert!(controller.is_idle());
    }

    #[test]
    fn test_release_on_deadline_is_tap() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 200));
        assert_eq!(
            host.actions(),
            vec![key(BasicKey::Btn2, true), key(BasicKey::Btn2, false)]
        );
    }

    #[test]
    fn test_late_event_catches_up_expired_window() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        // No tick ran; the next event still sees the hold first
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 500));
        assert_eq!(
            host.actions(),
            vec![
                HostAction::Layer {
                    layer: Layer::DpiControl,
                    enabled: true
                },
                HostAction::Layer {
                    layer: Layer::DpiControl,
                    enabled: false
                },
            ]
        );
    }

    #[test]
    fn test_press_interrupts_pending_tap() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 40));
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Left, 60));
        assert_eq!(
            host.actions(),
            vec![
                key(BasicKey::Btn2, true),
                key(BasicKey::Btn2, false),
                key(BasicKey::Btn1, true),
            ]
        );
        assert_eq!(controller.gesture(DanceKey::Btn2).classification(), Classification::None);
    }

    #[test]
    fn test_spurious_release_ignored() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Back, 10));
        assert!(host.events().is_empty());
        assert!(controller.is_idle());
    }

    #[test]
    fn test_encoder_scrolls_horizontally_on_raise() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        assert!(controller.on_encoder(&mut host, true));
        assert!(host.events().is_empty());

        host.enable(Layer::Raise);
        assert!(!controller.on_encoder(&mut host, true));
        assert!(!controller.on_encoder(&mut host, false));
        assert_eq!(
            &host.actions()[1..],
            &[
                key(BasicKey::WheelLeft, true),
                key(BasicKey::WheelLeft, false),
                key(BasicKey::WheelRight, true),
                key(BasicKey::WheelRight, false),
            ]
        );
    }

    #[test]
    fn test_initial_profile() {
        let controller = Controller::default().with_profile(Profile::Windows);
        assert_eq!(controller.current_mode(), Profile::Windows);
    }

    #[test]
    fn test_press_near_clock_limit() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        let dpi = |enabled| HostAction::Layer {
            layer: Layer::DpiControl,
            enabled,
        };

        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, u64::MAX - 10));
        assert_eq!(controller.next_deadline(), Some(u64::MAX));

        controller.tick(&mut host, u64::MAX);
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, u64::MAX));
        assert_eq!(host.actions(), vec![dpi(true), dpi(false)]);
        assert!(controller.is_idle());
    }

    #[test]
    fn test_only_one_window_open_at_a_time() {
        let mut host = RecordingHost::new();
        let mut controller = Controller::default();
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 40));
        assert_eq!(controller.counting(), 1);

        feed(&mut controller, &mut host, ButtonEvent::press(Button::Back, 60));
        assert_eq!(controller.counting(), 1);
        assert!(controller.classifier(DanceKey::Btn2).is_idle());
        assert!(controller.classifier(DanceKey::Btn4).is_counting());
        assert_eq!(
            host.actions(),
            vec![key(BasicKey::Btn2, true), key(BasicKey::Btn2, false)]
        );
    }

    #[test]
    fn test_shared_dance_key_ignores_second_button() {
        // Left and Right both drive the Btn2 sequence
        let keymap = Keymap::new([
            Keycode::TapDance(DanceKey::Btn2),
            Keycode::No,
            Keycode::TapDance(DanceKey::Btn2),
            Keycode::No,
            Keycode::No,
        ]);
        let mut host = RecordingHost::new();
        let mut controller = Controller::default().with_keymap(keymap.clone());
        assert_eq!(controller.keymap(), &keymap);
        let dpi = |enabled| HostAction::Layer {
            layer: Layer::DpiControl,
            enabled,
        };

        feed(&mut controller, &mut host, ButtonEvent::press(Button::Right, 0));
        controller.tick(&mut host, 200);
        assert_eq!(host.actions(), vec![dpi(true)]);

        // Left lands on the resolved hold and is dropped, release included
        feed(&mut controller, &mut host, ButtonEvent::press(Button::Left, 300));
        feed(&mut controller, &mut host, ButtonEvent::release(Button::Left, 350));
        assert_eq!(host.actions(), vec![dpi(true)]);
        assert!(host.is_enabled(Layer::DpiControl));

        feed(&mut controller, &mut host, ButtonEvent::release(Button::Right, 400));
        assert_eq!(host.actions(), vec![dpi(true), dpi(false)]);
        assert!(host.is_settled());
        assert!(controller.is_idle());
    }
}
