//! Collaborator interfaces the core drives. The firmware loop supplies
//! implementations backed by the hardware timer and the HID report stack.

use crate::types::{KeyCode, Layer, Modifier, Timestamp};

/// Monotonic millisecond counter. Allowed to wrap.
pub trait Timer {
    fn now_ms(&self) -> Timestamp;
}

/// Side effects requested from the report stack and layer state.
pub trait Reporter {
    /// Produce a single press+release of `code`.
    fn emit_tap(&mut self, code: KeyCode);
    /// Drive a modifier directly, independent of tap emission.
    fn set_modifier_active(&mut self, modifier: Modifier, active: bool);
    fn activate_layer(&mut self, layer: Layer);
    fn deactivate_layer(&mut self, layer: Layer);
    fn deactivate_all_layers(&mut self);
}
