// Trackdance Synthetic Event Injector
// Reuses a device keycode's handler on behalf of a gesture

use smallvec::SmallVec;

use crate::button::Button;
use crate::host::{DeviceHandler, DeviceKey, EventSource};

/// Calls the device-key processing path directly, tagged as synthetic.
///
/// Tracks which keys each originating button holds down so that every
/// synthetic press is matched by exactly one synthetic release.
#[derive(Debug, Clone, Default)]
pub struct SyntheticInjector {
    held: [SmallVec<[DeviceKey; 2]>; Button::COUNT],
}

impl SyntheticInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a press or release of `key` on behalf of `origin`.
    ///
    /// Returns false when the event was dropped: a second press of a key
    /// the origin already holds, or a release of a key it does not hold.
    pub fn inject<H: DeviceHandler + ?Sized>(
        &mut self,
        host: &mut H,
        origin: Button,
        key: DeviceKey,
        pressed: bool,
    ) -> bool {
        let held = &mut self.held[origin.index()];
        let position = held.iter().position(|k| *k == key);

        match (pressed, position) {
            (true, None) => held.push(key),
            (false, Some(pos)) => {
                held.remove(pos);
            }
            (true, Some(_)) => {
                log::warn!("synthetic {} already held by {}, press dropped", key, origin);
                return false;
            }
            (false, None) => {
                log::warn!("synthetic {} not held by {}, release dropped", key, origin);
                return false;
            }
        }

        log::debug!(
            "inject {} {} for {}",
            key,
            if pressed { "press" } else { "release" },
            origin
        );
        host.process_device_key(key, pressed, EventSource::Synthetic(origin));
        true
    }

    /// Keys currently held on behalf of `origin`
    pub fn held(&self, origin: Button) -> &[DeviceKey] {
        &self.held[origin.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostAction, RecordingHost};

    #[test]
    fn test_inject_pairs_press_and_release() {
        let mut host = RecordingHost::new();
        let mut injector = SyntheticInjector::new();

        assert!(injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, true));
        assert_eq!(injector.held(Button::Back), &[DeviceKey::DragScroll]);
        assert!(injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, false));
        assert!(injector.held(Button::Back).is_empty());

        assert_eq!(
            host.actions(),
            vec![
                HostAction::Device {
                    key: DeviceKey::DragScroll,
                    pressed: true,
                    source: EventSource::Synthetic(Button::Back),
                },
                HostAction::Device {
                    key: DeviceKey::DragScroll,
                    pressed: false,
                    source: EventSource::Synthetic(Button::Back),
                },
            ]
        );
        assert!(host.is_settled());
    }

    #[test]
    fn test_duplicate_press_dropped() {
        let mut host = RecordingHost::new();
        let mut injector = SyntheticInjector::new();
        injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, true);
        assert!(!injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, true));
        assert_eq!(host.events().len(), 1);
    }

    #[test]
    fn test_release_without_press_dropped() {
        let mut host = RecordingHost::new();
        let mut injector = SyntheticInjector::new();
        assert!(!injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, false));
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_origins_are_independent() {
        let mut host = RecordingHost::new();
        let mut injector = SyntheticInjector::new();
        injector.inject(&mut host, Button::Back, DeviceKey::DragScroll, true);
        // Another button cannot release what Back holds
        assert!(!injector.inject(&mut host, Button::Forward, DeviceKey::DragScroll, false));
        assert_eq!(injector.held(Button::Back), &[DeviceKey::DragScroll]);
    }
}
