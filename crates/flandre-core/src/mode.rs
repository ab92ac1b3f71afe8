use crate::output::Reporter;
use crate::types::Layer;
use tracing::info;

/// Input mode of the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Stenographic input, typing by phonetics.
    #[default]
    Steno,
    /// Alphabetic input, typing by spelling. Has a number overlay.
    Alpha,
}

impl Mode {
    pub const fn base_layer(self) -> Layer {
        match self {
            Mode::Steno => Layer::Steno,
            Mode::Alpha => Layer::Alpha,
        }
    }

    pub const fn other(self) -> Mode {
        match self {
            Mode::Steno => Mode::Alpha,
            Mode::Alpha => Mode::Steno,
        }
    }
}

#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch to the other mode.
    ///
    /// All layers are dropped before the new base layer goes on, so an overlay
    /// whose key is still held does not survive the switch.
    pub fn toggle(&mut self, out: &mut impl Reporter) {
        let next = self.mode.other();
        out.deactivate_all_layers();
        out.activate_layer(next.base_layer());
        info!("Mode: {:?} -> {:?}", self.mode, next);
        self.mode = next;
    }

    pub(crate) fn reset(&mut self) {
        self.mode = Mode::Steno;
    }
}
