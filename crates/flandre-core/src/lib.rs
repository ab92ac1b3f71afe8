pub mod chord_gate;
pub mod config;
pub mod engine;
pub mod keymap;
pub mod mode;
pub mod output;
pub mod recorder;
pub mod script;
pub mod tap_hold;
pub mod types;

pub use config::Settings;
pub use engine::Engine;
pub use keymap::{KeyRole, Keymap, TapHoldBinding};
pub use mode::Mode;
pub use output::{Reporter, Timer};
pub use types::{KeyCode, KeyId, Layer, Modifier, Timestamp};
