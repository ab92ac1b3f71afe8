//! In-memory collaborators for tests, benches and script replay.

use crate::output::{Reporter, Timer};
use crate::types::{KeyCode, Layer, Modifier, Modifiers, Timestamp};
use std::cell::Cell;

/// One side effect requested by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Tap(KeyCode),
    ModOn(Modifier),
    ModOff(Modifier),
    LayerOn(Layer),
    LayerOff(Layer),
    AllLayersOff,
}

/// Reporter that logs every request and mirrors modifier and layer state.
#[derive(Debug, Default)]
pub struct Recorder {
    reports: Vec<Report>,
    mods: Modifiers,
    layers: u8,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Tapped codes in emission order.
    pub fn taps(&self) -> Vec<KeyCode> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Tap(code) => Some(*code),
                _ => None,
            })
            .collect()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.mods
    }

    pub fn is_layer_active(&self, layer: Layer) -> bool {
        self.layers & (1 << layer.index()) != 0
    }

    pub fn active_layers(&self) -> Vec<Layer> {
        [Layer::Steno, Layer::Alpha, Layer::Number]
            .into_iter()
            .filter(|l| self.is_layer_active(*l))
            .collect()
    }

    /// Forget recorded reports but keep modifier and layer state.
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl Reporter for Recorder {
    fn emit_tap(&mut self, code: KeyCode) {
        self.reports.push(Report::Tap(code));
    }

    fn set_modifier_active(&mut self, modifier: Modifier, active: bool) {
        self.mods.set(modifier, active);
        self.reports.push(if active {
            Report::ModOn(modifier)
        } else {
            Report::ModOff(modifier)
        });
    }

    fn activate_layer(&mut self, layer: Layer) {
        self.layers |= 1 << layer.index();
        self.reports.push(Report::LayerOn(layer));
    }

    fn deactivate_layer(&mut self, layer: Layer) {
        self.layers &= !(1 << layer.index());
        self.reports.push(Report::LayerOff(layer));
    }

    fn deactivate_all_layers(&mut self) {
        self.layers = 0;
        self.reports.push(Report::AllLayersOff);
    }
}

/// Timer whose value is set by hand.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Cell<u16>,
}

impl ManualTimer {
    pub fn new(start: u16) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, ms: u16) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u16) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Timer for ManualTimer {
    fn now_ms(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}
