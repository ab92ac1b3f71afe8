use crate::chord_gate::{ChordGate, ChordMask};
use crate::config::{ChordRelease, ConfigError, Settings};
use crate::keymap::{KeyRole, Keymap};
use crate::mode::{Mode, ModeController};
use crate::output::{Reporter, Timer};
use crate::tap_hold::TapHoldResolver;
use crate::types::{KeyEdge, KeyId};
use tracing::debug;

/// Event-handling context owned by the firmware loop.
pub struct Engine {
    keymap: Keymap,
    settings: Settings,
    chord_gate: ChordGate,
    tap_hold: TapHoldResolver,
    mode: ModeController,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            keymap: Keymap::flandre(),
            settings: Settings::default(),
            chord_gate: ChordGate::new(),
            tap_hold: TapHoldResolver::new(),
            mode: ModeController::new(),
        }
    }
}

impl Engine {
    pub fn new(keymap: Keymap, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            keymap,
            settings,
            chord_gate: ChordGate::new(),
            tap_hold: TapHoldResolver::new(),
            mode: ModeController::new(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Keys already down keep their press records.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn chord_mask(&self) -> ChordMask {
        self.chord_gate.mask()
    }

    pub fn tap_hold(&self) -> &TapHoldResolver {
        &self.tap_hold
    }

    /// Drop all transient state and return to steno mode. Layers and
    /// modifiers held by the reporter are left to the caller.
    pub fn reset(&mut self) {
        self.chord_gate.reset();
        self.tap_hold.reset();
        self.mode.reset();
    }

    /// Process one physical key transition.
    ///
    /// Returns `true` when the event should continue to regular keymap
    /// processing, `false` when it was handled here.
    pub fn on_key_event(
        &mut self,
        key: KeyId,
        pressed: bool,
        timer: &impl Timer,
        out: &mut impl Reporter,
    ) -> bool {
        let now = timer.now_ms();
        match self.keymap.role(key) {
            KeyRole::Simple => true,
            KeyRole::TapHold(binding) => {
                self.tap_hold
                    .handle(pressed, binding, key, now, &self.settings, out);
                false
            }
            KeyRole::ChordMember { bit, binding } => {
                if self.chord_gate.handle(bit, pressed, &mut self.mode, out) {
                    self.tap_hold
                        .handle(pressed, binding, key, now, &self.settings, out);
                } else if self.settings.chord_release == ChordRelease::Swallow {
                    self.consume_chord(out);
                }
                false
            }
            KeyRole::Momentary(layer) => {
                debug!("Momentary: {:?} {:?}", layer, KeyEdge::from_pressed(pressed));
                if pressed {
                    out.activate_layer(layer);
                } else {
                    out.deactivate_layer(layer);
                }
                false
            }
        }
    }

    // Keys that formed the combo must not emit anything on release.
    fn consume_chord(&mut self, out: &mut impl Reporter) {
        for key in self.keymap.chord_members().collect::<Vec<_>>() {
            if let KeyRole::ChordMember { binding, .. } = self.keymap.role(key) {
                self.tap_hold.cancel(key, binding, out);
            }
        }
    }
}
