// Trackdance Action Dispatcher
// Binding table and the effects run when gestures resolve and reset

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::button::{Button, DanceKey};
use crate::gesture::Classification;
use crate::host::{DeviceKey, EventSource, Host};
use crate::inject::SyntheticInjector;
use crate::keycode::{BasicKey, Chord};
use crate::keymap::{CustomKey, Keycode};
use crate::layer::Layer;
use crate::mode::{ModeState, Profile};
use crate::shortcuts::{Shortcut, ShortcutTable};

/// Something that turns into a chord when emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySource {
    /// Always the same chord
    Fixed(Chord),
    /// Chord picked from the shortcut table for the live profile
    Shortcut(Shortcut),
}

impl KeySource {
    /// The chord this source emits under `profile`
    pub fn resolve(self, shortcuts: &ShortcutTable, profile: Profile) -> Chord {
        match self {
            KeySource::Fixed(chord) => chord,
            KeySource::Shortcut(shortcut) => shortcuts.chord(shortcut, profile),
        }
    }
}

impl From<BasicKey> for KeySource {
    fn from(key: BasicKey) -> Self {
        KeySource::Fixed(Chord::key(key))
    }
}

impl From<Chord> for KeySource {
    fn from(chord: Chord) -> Self {
        KeySource::Fixed(chord)
    }
}

impl From<Shortcut> for KeySource {
    fn from(shortcut: Shortcut) -> Self {
        KeySource::Shortcut(shortcut)
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Fixed(chord) => write!(f, "{}", chord),
            KeySource::Shortcut(shortcut) => write!(f, "{}", shortcut),
        }
    }
}

/// One side effect of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Emit { key: KeySource, pressed: bool },
    Layer { layer: Layer, enabled: bool },
    /// Press or release a device key through the synthetic injector
    Synthetic { key: DeviceKey, pressed: bool },
    NoOp,
}

impl Effect {
    pub fn press(key: impl Into<KeySource>) -> Self {
        Effect::Emit {
            key: key.into(),
            pressed: true,
        }
    }

    pub fn layer_on(layer: Layer) -> Self {
        Effect::Layer {
            layer,
            enabled: true,
        }
    }

    pub fn inject(key: DeviceKey) -> Self {
        Effect::Synthetic { key, pressed: true }
    }

    /// The effect that undoes this one
    pub fn inverse(self) -> Self {
        match self {
            Effect::Emit { key, pressed } => Effect::Emit {
                key,
                pressed: !pressed,
            },
            Effect::Layer { layer, enabled } => Effect::Layer {
                layer,
                enabled: !enabled,
            },
            Effect::Synthetic { key, pressed } => Effect::Synthetic {
                key,
                pressed: !pressed,
            },
            Effect::NoOp => Effect::NoOp,
        }
    }

    /// What this effect holds or lets go, and in which direction
    fn balance(&self) -> Option<(EffectTarget, i32)> {
        let sign = |on: bool| if on { 1 } else { -1 };
        match *self {
            Effect::Emit { key, pressed } => Some((EffectTarget::Key(key), sign(pressed))),
            Effect::Layer { layer, enabled } => Some((EffectTarget::Layer(layer), sign(enabled))),
            Effect::Synthetic { key, pressed } => {
                Some((EffectTarget::Device(key), sign(pressed)))
            }
            Effect::NoOp => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectTarget {
    Key(KeySource),
    Layer(Layer),
    Device(DeviceKey),
}

impl fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectTarget::Key(key) => write!(f, "key {}", key),
            EffectTarget::Layer(layer) => write!(f, "layer {}", layer),
            EffectTarget::Device(key) => write!(f, "device key {}", key),
        }
    }
}

/// Errors from building a binding table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("{key} {classification}: {target} is not released exactly once on reset")]
    Unbalanced {
        key: DanceKey,
        classification: Classification,
        target: String,
    },
}

/// Effects run when a gesture resolves and when it resets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionBinding {
    on_resolve: SmallVec<[Effect; 2]>,
    on_reset: SmallVec<[Effect; 2]>,
}

impl ActionBinding {
    pub fn new(
        on_resolve: impl IntoIterator<Item = Effect>,
        on_reset: impl IntoIterator<Item = Effect>,
    ) -> Self {
        Self {
            on_resolve: on_resolve.into_iter().collect(),
            on_reset: on_reset.into_iter().collect(),
        }
    }

    /// Binding whose reset undoes `effects` in reverse order
    pub fn paired(effects: impl IntoIterator<Item = Effect>) -> Self {
        let on_resolve: SmallVec<[Effect; 2]> = effects.into_iter().collect();
        let on_reset = on_resolve.iter().rev().map(|e| e.inverse()).collect();
        Self {
            on_resolve,
            on_reset,
        }
    }

    /// Binding that does nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_resolve(&self) -> &[Effect] {
        &self.on_resolve
    }

    pub fn on_reset(&self) -> &[Effect] {
        &self.on_reset
    }

    /// Every press, enable and injection in `on_resolve` is undone exactly
    /// once by `on_reset`
    pub fn is_balanced(&self) -> bool {
        self.unbalanced_target().is_none()
    }

    fn unbalanced_target(&self) -> Option<EffectTarget> {
        let mut totals: Vec<(EffectTarget, i32, i32)> = Vec::new();
        let sides = [(&self.on_resolve, true), (&self.on_reset, false)];

        for (effects, resolving) in sides {
            for (target, delta) in effects.iter().filter_map(Effect::balance) {
                let index = match totals.iter().position(|(t, _, _)| *t == target) {
                    Some(index) => index,
                    None => {
                        totals.push((target, 0, 0));
                        totals.len() - 1
                    }
                };
                if resolving {
                    totals[index].1 += delta;
                } else {
                    totals[index].2 += delta;
                }
            }
        }

        totals
            .into_iter()
            .find(|(_, resolve, reset)| *resolve < 0 || resolve + reset != 0)
            .map(|(target, _, _)| target)
    }
}

/// Bindings keyed by tap-dance key and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    bindings: HashMap<(DanceKey, Classification), ActionBinding>,
    eager_double_tap: [bool; DanceKey::COUNT],
}

impl BindingTable {
    /// Empty table, eager double taps on every key
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            eager_double_tap: [true; DanceKey::COUNT],
        }
    }

    /// Add or replace a binding, rejecting it if its reset does not undo
    /// its resolve
    pub fn insert(
        &mut self,
        key: DanceKey,
        classification: Classification,
        binding: ActionBinding,
    ) -> Result<(), BindingError> {
        check(key, classification, &binding)?;
        self.bindings.insert((key, classification), binding);
        Ok(())
    }

    /// Builder form of [`BindingTable::insert`]
    pub fn bind(
        mut self,
        key: DanceKey,
        classification: Classification,
        binding: ActionBinding,
    ) -> Result<Self, BindingError> {
        self.insert(key, classification, binding)?;
        Ok(self)
    }

    pub fn get(&self, key: DanceKey, classification: Classification) -> Option<&ActionBinding> {
        self.bindings.get(&(key, classification))
    }

    pub fn set_eager_double_tap(&mut self, key: DanceKey, eager: bool) {
        self.eager_double_tap[key.index()] = eager;
    }

    pub fn eager_double_tap(&self, key: DanceKey) -> bool {
        self.eager_double_tap[key.index()]
    }

    /// Check every binding
    pub fn validate(&self) -> Result<(), BindingError> {
        self.bindings
            .iter()
            .try_for_each(|((key, classification), binding)| check(*key, *classification, binding))
    }

    /// The trackball's stock bindings:
    ///
    /// - `Btn2`: tap clicks mouse button 2, double tap sends Enter, hold
    ///   enables the DPI layer.
    /// - `Btn4`: tap clicks mouse button 4, double tap moves one desktop
    ///   left, hold enables Raise and drag scroll.
    /// - `Btn5`: tap clicks mouse button 5, double tap moves one desktop
    ///   right, hold enables Lower.
    pub fn trackball() -> Self {
        use Classification::{DoubleTap, SingleHold, SingleTap};

        let stock = [
            (DanceKey::Btn2, SingleTap, ActionBinding::paired([Effect::press(BasicKey::Btn2)])),
            (DanceKey::Btn2, DoubleTap, ActionBinding::paired([Effect::press(BasicKey::Enter)])),
            (DanceKey::Btn2, SingleHold, ActionBinding::paired([Effect::layer_on(Layer::DpiControl)])),
            (DanceKey::Btn4, SingleTap, ActionBinding::paired([Effect::press(BasicKey::Btn4)])),
            (DanceKey::Btn4, DoubleTap, ActionBinding::paired([Effect::press(Shortcut::DesktopLeft)])),
            (
                DanceKey::Btn4,
                SingleHold,
                ActionBinding::paired([
                    Effect::layer_on(Layer::Raise),
                    Effect::inject(DeviceKey::DragScroll),
                ]),
            ),
            (DanceKey::Btn5, SingleTap, ActionBinding::paired([Effect::press(BasicKey::Btn5)])),
            (DanceKey::Btn5, DoubleTap, ActionBinding::paired([Effect::press(Shortcut::DesktopRight)])),
            (DanceKey::Btn5, SingleHold, ActionBinding::paired([Effect::layer_on(Layer::Lower)])),
        ];

        let mut table = Self::new();
        for (key, classification, binding) in stock {
            table.bindings.insert((key, classification), binding);
        }
        table
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::trackball()
    }
}

fn check(
    key: DanceKey,
    classification: Classification,
    binding: &ActionBinding,
) -> Result<(), BindingError> {
    match binding.unbalanced_target() {
        Some(target) => Err(BindingError::Unbalanced {
            key,
            classification,
            target: target.to_string(),
        }),
        None => Ok(()),
    }
}

/// Chords each button currently holds, with the source they came from
type Journal = SmallVec<[(KeySource, Chord); 2]>;

/// Runs binding effects and plain keycodes against the host.
///
/// Every chord pressed on behalf of a button is journaled with the source
/// it came from, and releases go through the journal. A shortcut therefore
/// releases the chord that was actually pressed even when the profile
/// changed in between.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    bindings: BindingTable,
    shortcuts: ShortcutTable,
    journal: [Journal; Button::COUNT],
    injector: SyntheticInjector,
    drag_locked: bool,
}

impl ActionDispatcher {
    pub fn new(bindings: BindingTable, shortcuts: ShortcutTable) -> Self {
        Self {
            bindings,
            shortcuts,
            journal: Default::default(),
            injector: SyntheticInjector::new(),
            drag_locked: false,
        }
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn shortcuts(&self) -> &ShortcutTable {
        &self.shortcuts
    }

    /// True while mouse button 1 is latched by drag lock
    pub fn is_drag_locked(&self) -> bool {
        self.drag_locked
    }

    /// Chords currently pressed on behalf of `origin`
    pub fn held_chords(&self, origin: Button) -> impl Iterator<Item = Chord> + '_ {
        self.journal[origin.index()].iter().map(|(_, chord)| *chord)
    }

    /// Device keys currently injected on behalf of `origin`
    pub fn injected(&self, origin: Button) -> &[DeviceKey] {
        self.injector.held(origin)
    }

    /// Run the resolve side of the binding for `key`/`classification`
    pub fn finish<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        profile: Profile,
        origin: Button,
        key: DanceKey,
        classification: Classification,
    ) {
        log::debug!("finish {} {} from {}", key, classification, origin);
        let Some(binding) = self.bindings.get(key, classification) else {
            log::debug!("no binding for {} {}", key, classification);
            return;
        };
        let effects = binding.on_resolve.clone();
        for effect in effects {
            self.apply(host, profile, origin, effect);
        }
    }

    /// Run the reset side of the binding for `key`/`classification`
    pub fn reset<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        profile: Profile,
        origin: Button,
        key: DanceKey,
        classification: Classification,
    ) {
        log::debug!("reset {} {} from {}", key, classification, origin);
        let Some(binding) = self.bindings.get(key, classification) else {
            return;
        };
        let effects = binding.on_reset.clone();
        for effect in effects {
            self.apply(host, profile, origin, effect);
        }
    }

    /// Handle a press or release of a keycode that is not a tap-dance key
    pub fn process_record<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        mode: &mut ModeState,
        origin: Button,
        keycode: Keycode,
        pressed: bool,
    ) {
        match keycode {
            Keycode::No | Keycode::Transparent => {}
            Keycode::TapDance(key) => {
                log::warn!("{} reached plain processing from {}, ignored", key, origin);
            }
            Keycode::Basic(chord) => {
                self.emit(host, mode.current(), origin, KeySource::Fixed(chord), pressed)
            }
            Keycode::Momentary(layer) => {
                if pressed {
                    host.enable(layer);
                } else {
                    host.disable(layer);
                }
            }
            Keycode::Device(key) => {
                host.process_device_key(key, pressed, EventSource::Physical(origin))
            }
            Keycode::Custom(custom) => self.process_custom(host, mode, origin, custom, pressed),
        }
    }

    fn process_custom<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        mode: &mut ModeState,
        origin: Button,
        key: CustomKey,
        pressed: bool,
    ) {
        if let Some(shortcut) = key.shortcut() {
            self.emit(
                host,
                mode.current(),
                origin,
                KeySource::Shortcut(shortcut),
                pressed,
            );
            return;
        }

        match key {
            CustomKey::DragLockOn if pressed => {
                if self.drag_locked {
                    log::warn!("drag lock already latched, ignored");
                    return;
                }
                self.drag_locked = true;
                host.emit(Chord::key(BasicKey::Btn1), true);
                host.enable(Layer::DragLock);
                log::debug!("drag lock on");
            }
            CustomKey::DragLockOff if !pressed => {
                if !self.drag_locked {
                    log::warn!("drag lock not latched, unlock ignored");
                    return;
                }
                self.drag_locked = false;
                host.disable(Layer::DragLock);
                host.emit(Chord::key(BasicKey::Btn1), false);
                log::debug!("drag lock off");
            }
            CustomKey::ToggleProfile if pressed => {
                mode.toggle();
            }
            _ => {}
        }
    }

    fn apply<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        profile: Profile,
        origin: Button,
        effect: Effect,
    ) {
        match effect {
            Effect::Emit { key, pressed } => self.emit(host, profile, origin, key, pressed),
            Effect::Layer { layer, enabled } => {
                if enabled {
                    host.enable(layer);
                } else {
                    host.disable(layer);
                }
            }
            Effect::Synthetic { key, pressed } => {
                self.injector.inject(host, origin, key, pressed);
            }
            Effect::NoOp => {}
        }
    }

    fn emit<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        profile: Profile,
        origin: Button,
        source: KeySource,
        pressed: bool,
    ) {
        let journal = &mut self.journal[origin.index()];
        let recorded = journal.iter().position(|(s, _)| *s == source);

        if pressed {
            if recorded.is_some() {
                log::warn!("{} already pressed from {}, ignored", source, origin);
                return;
            }
            let chord = source.resolve(&self.shortcuts, profile);
            journal.push((source, chord));
            host.emit(chord, true);
        } else {
            let Some(index) = recorded else {
                log::warn!("{} not pressed from {}, release ignored", source, origin);
                return;
            };
            let (_, chord) = journal.remove(index);
            host.emit(chord, false);
        }
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new(BindingTable::default(), ShortcutTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostAction, LayerController, RecordingHost};
    use crate::keycode::Modifier;

    fn key(chord: Chord, pressed: bool) -> HostAction {
        HostAction::Key { chord, pressed }
    }

    #[test]
    fn test_paired_binding_reverses_inverses() {
        let binding = ActionBinding::paired([
            Effect::layer_on(Layer::Raise),
            Effect::inject(DeviceKey::DragScroll),
        ]);
        assert_eq!(
            binding.on_reset(),
            &[
                Effect::Synthetic {
                    key: DeviceKey::DragScroll,
                    pressed: false
                },
                Effect::Layer {
                    layer: Layer::Raise,
                    enabled: false
                },
            ]
        );
        assert!(binding.is_balanced());
    }

    #[test]
    fn test_unbalanced_binding_rejected() {
        let binding = ActionBinding::new([Effect::layer_on(Layer::Lower)], Vec::new());
        assert!(!binding.is_balanced());

        let mut table = BindingTable::new();
        let err = table
            .insert(DanceKey::Btn5, Classification::SingleHold, binding)
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::Unbalanced {
                key: DanceKey::Btn5,
                classification: Classification::SingleHold,
                target: "layer lower".to_string(),
            }
        );
        assert!(table.get(DanceKey::Btn5, Classification::SingleHold).is_none());
    }

    #[test]
    fn test_release_before_press_rejected() {
        let release = Effect::press(BasicKey::Enter).inverse();
        let binding = ActionBinding::new([release], [Effect::press(BasicKey::Enter)]);
        assert!(!binding.is_balanced());
    }

    #[test]
    fn test_tap_inside_resolve_is_balanced() {
        let press = Effect::press(BasicKey::Enter);
        let binding = ActionBinding::new([press, press.inverse()], Vec::new());
        assert!(binding.is_balanced());
        assert!(ActionBinding::none().is_balanced());
    }

    #[test]
    fn test_trackball_bindings_are_valid() {
        let table = BindingTable::trackball();
        assert!(table.validate().is_ok());
        assert!(table.get(DanceKey::Btn2, Classification::Unknown).is_none());
        assert!(table.eager_double_tap(DanceKey::Btn4));
    }

    #[test]
    fn test_finish_and_reset_tap() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let btn2 = Chord::key(BasicKey::Btn2);

        dispatcher.finish(&mut host, Profile::Mac, Button::Right, DanceKey::Btn2, Classification::SingleTap);
        assert_eq!(dispatcher.held_chords(Button::Right).collect::<Vec<_>>(), vec![btn2]);
        dispatcher.reset(&mut host, Profile::Mac, Button::Right, DanceKey::Btn2, Classification::SingleTap);

        assert_eq!(host.actions(), vec![key(btn2, true), key(btn2, false)]);
        assert!(host.is_settled());
    }

    #[test]
    fn test_hold_enables_layer_and_injects() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();

        dispatcher.finish(&mut host, Profile::Mac, Button::Back, DanceKey::Btn4, Classification::SingleHold);
        assert!(host.is_enabled(Layer::Raise));
        assert_eq!(dispatcher.injected(Button::Back), &[DeviceKey::DragScroll]);

        dispatcher.reset(&mut host, Profile::Mac, Button::Back, DanceKey::Btn4, Classification::SingleHold);
        assert!(dispatcher.injected(Button::Back).is_empty());
        assert!(host.is_settled());
    }

    #[test]
    fn test_reset_releases_chord_emitted_at_finish() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mac = Chord::key(BasicKey::Left).with(Modifier::LCtrl);

        dispatcher.finish(&mut host, Profile::Mac, Button::Back, DanceKey::Btn4, Classification::DoubleTap);
        dispatcher.reset(&mut host, Profile::Windows, Button::Back, DanceKey::Btn4, Classification::DoubleTap);

        assert_eq!(host.actions(), vec![key(mac, true), key(mac, false)]);
        assert!(host.is_settled());
    }

    #[test]
    fn test_unbound_classification_is_noop() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        dispatcher.finish(&mut host, Profile::Mac, Button::Right, DanceKey::Btn2, Classification::Unknown);
        dispatcher.reset(&mut host, Profile::Mac, Button::Right, DanceKey::Btn2, Classification::Unknown);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_shortcut_release_survives_profile_toggle() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mut mode = ModeState::default();
        let copy = Keycode::Custom(CustomKey::Copy);

        dispatcher.process_record(&mut host, &mut mode, Button::Right, copy, true);
        mode.toggle();
        dispatcher.process_record(&mut host, &mut mode, Button::Right, copy, false);

        let cmd_c = Chord::key(BasicKey::C).with(Modifier::LGui);
        assert_eq!(host.actions(), vec![key(cmd_c, true), key(cmd_c, false)]);
        assert!(host.is_settled());
    }

    #[test]
    fn test_momentary_and_device_keys() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mut mode = ModeState::default();

        let system = Keycode::Momentary(Layer::System);
        dispatcher.process_record(&mut host, &mut mode, Button::Forward, system, true);
        assert!(host.is_enabled(Layer::System));
        dispatcher.process_record(&mut host, &mut mode, Button::Forward, system, false);
        assert!(!host.is_enabled(Layer::System));

        let dpi = Keycode::Device(DeviceKey::DpiConfig);
        dispatcher.process_record(&mut host, &mut mode, Button::Middle, dpi, true);
        assert_eq!(
            host.actions().last(),
            Some(&HostAction::Device {
                key: DeviceKey::DpiConfig,
                pressed: true,
                source: EventSource::Physical(Button::Middle),
            })
        );
        dispatcher.process_record(&mut host, &mut mode, Button::Middle, dpi, false);
        assert!(host.is_settled());
    }

    #[test]
    fn test_drag_lock_latches_once() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mut mode = ModeState::default();
        let on = Keycode::Custom(CustomKey::DragLockOn);
        let off = Keycode::Custom(CustomKey::DragLockOff);
        let btn1 = Chord::key(BasicKey::Btn1);

        dispatcher.process_record(&mut host, &mut mode, Button::Left, on, true);
        dispatcher.process_record(&mut host, &mut mode, Button::Left, on, false);
        assert!(dispatcher.is_drag_locked());
        assert_eq!(host.held_chords(), &[btn1]);
        assert!(host.is_enabled(Layer::DragLock));

        // Second lock is ignored
        dispatcher.process_record(&mut host, &mut mode, Button::Left, on, true);
        assert_eq!(host.held_chords(), &[btn1]);

        dispatcher.process_record(&mut host, &mut mode, Button::Left, off, true);
        assert!(dispatcher.is_drag_locked());
        dispatcher.process_record(&mut host, &mut mode, Button::Left, off, false);
        assert!(!dispatcher.is_drag_locked());
        assert!(host.is_settled());

        // Stray unlock is ignored
        dispatcher.process_record(&mut host, &mut mode, Button::Left, off, false);
        assert!(host.is_settled());
    }

    #[test]
    fn test_toggle_profile_on_press_only() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mut mode = ModeState::default();
        let toggle = Keycode::Custom(CustomKey::ToggleProfile);

        dispatcher.process_record(&mut host, &mut mode, Button::Right, toggle, true);
        assert_eq!(mode.current(), Profile::Windows);
        dispatcher.process_record(&mut host, &mut mode, Button::Right, toggle, false);
        assert_eq!(mode.current(), Profile::Windows);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_unmatched_release_is_dropped() {
        let mut host = RecordingHost::new();
        let mut dispatcher = ActionDispatcher::default();
        let mut mode = ModeState::default();
        let btn3 = Keycode::from(BasicKey::Btn3);
        dispatcher.process_record(&mut host, &mut mode, Button::Left, btn3, false);
        assert!(host.events().is_empty());
        assert!(host.is_settled());
    }
}
