// Trackdance Replay
// Simulated scan loop driving a controller from a timed script

use crate::button::Timestamp;
use crate::controller::Controller;
use crate::host::{KeyEmitter, RecordingHost};
use crate::keycode::{BasicKey, Chord};

use super::script::{ScriptAction, ScriptEvent};

/// Default scan interval in milliseconds
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1;

/// Replays script events against a controller, ticking it the way the
/// firmware's matrix scan would: every `scan_interval_ms`, starting at 0.
#[derive(Debug, Clone)]
pub struct Replayer {
    scan_interval_ms: u64,
    next_tick: Timestamp,
}

impl Replayer {
    /// Create a replayer; an interval of 0 is treated as 1
    pub fn new(scan_interval_ms: u64) -> Self {
        Self {
            scan_interval_ms: scan_interval_ms.max(1),
            next_tick: 0,
        }
    }

    pub fn scan_interval_ms(&self) -> u64 {
        self.scan_interval_ms
    }

    /// Replay every event, then keep scanning until no window is open
    pub fn run(
        &mut self,
        controller: &mut Controller,
        host: &mut RecordingHost,
        events: &[ScriptEvent],
    ) {
        for event in events {
            self.feed(controller, host, *event);
        }
        self.settle(controller, host);
    }

    /// Run the scan ticks that fall before `time`.
    ///
    /// Only ticks that can close a window are run; the grid position after
    /// an idle gap is the same as if every tick had run.
    pub fn advance_to(&mut self, controller: &mut Controller, host: &mut RecordingHost, time: Timestamp) {
        while self.next_tick < time {
            match controller.next_deadline().map(|deadline| self.grid_tick(deadline)) {
                Some(tick) if tick < time => {
                    self.next_tick = self.next_tick.max(tick);
                    self.scan(controller, host);
                }
                _ => self.next_tick = self.next_tick.max(self.grid_tick(time)),
            }
        }
    }

    /// Deliver one event at its timestamp
    pub fn feed(&mut self, controller: &mut Controller, host: &mut RecordingHost, event: ScriptEvent) {
        self.advance_to(controller, host, event.time);
        host.set_time(event.time);

        match event.action {
            ScriptAction::Button { .. } => {
                if let Some(button_event) = event.button_event() {
                    controller.on_event(host, button_event);
                }
            }
            ScriptAction::Tick => controller.tick(host, event.time),
            ScriptAction::Encoder { clockwise } => {
                if controller.on_encoder(host, clockwise) {
                    // Default pointing-device scroll
                    let wheel = if clockwise {
                        BasicKey::WheelDown
                    } else {
                        BasicKey::WheelUp
                    };
                    host.tap(Chord::key(wheel));
                }
            }
            ScriptAction::ToggleMode => {
                controller.toggle_mode();
            }
        }
    }

    /// Scan until every open window has closed
    pub fn settle(&mut self, controller: &mut Controller, host: &mut RecordingHost) {
        while let Some(deadline) = controller.next_deadline() {
            self.next_tick = self.next_tick.max(self.grid_tick(deadline));
            self.scan(controller, host);
        }
    }

    /// First tick of the scan grid at or after `time`
    fn grid_tick(&self, time: Timestamp) -> Timestamp {
        time.div_ceil(self.scan_interval_ms)
            .saturating_mul(self.scan_interval_ms)
    }

    fn scan(&mut self, controller: &mut Controller, host: &mut RecordingHost) {
        let now = self.next_tick;
        host.set_time(now);
        controller.tick(host, now);
        self.next_tick = self.next_tick.saturating_add(self.scan_interval_ms);
    }
}

impl Default for Replayer {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_INTERVAL_MS)
    }
}
