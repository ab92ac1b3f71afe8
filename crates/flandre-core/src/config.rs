use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest tapping term that still compares correctly across a wrap of the
/// 16-bit millisecond timer.
pub const MAX_TAPPING_TERM_MS: u16 = 0x7FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tapping term must be greater than zero")]
    ZeroTappingTerm,
    #[error("tapping term {0}ms exceeds the 32767ms timer wrap limit")]
    TappingTermTooLong(u16),
}

/// How pending tap-hold presses are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingPolicy {
    /// One record per key; rolled keys resolve independently.
    PerKey,
    /// One shared record; a later tap-hold press overwrites an earlier one,
    /// so the earlier key resolves as a hold on release.
    SingleSlot,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self::PerKey
    }
}

/// What happens to a modifier hold action once its key resolves as a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierRelease {
    /// Release the modifier with the key that activated it.
    OnKeyRelease,
    /// Leave the modifier active after release until a later tap of a
    /// binding with the same modifier rolls it back.
    Leave,
}

impl Default for ModifierRelease {
    fn default() -> Self {
        Self::OnKeyRelease
    }
}

/// What happens to the releases of the keys that completed the mode chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordRelease {
    /// Drop the chord keys' press records; their releases emit nothing.
    Swallow,
    /// Releases go on to tap-hold resolution like any other release.
    Forward,
}

impl Default for ChordRelease {
    fn default() -> Self {
        Self::Swallow
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(default = "default_tapping_term_ms")]
    pub tapping_term_ms: u16,
    #[serde(default)]
    pub pending_policy: PendingPolicy,
    #[serde(default)]
    pub modifier_release: ModifierRelease,
    #[serde(default)]
    pub chord_release: ChordRelease,
}

fn default_tapping_term_ms() -> u16 {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tapping_term_ms: default_tapping_term_ms(),
            pending_policy: PendingPolicy::PerKey,
            modifier_release: ModifierRelease::OnKeyRelease,
            chord_release: ChordRelease::Swallow,
        }
    }
}

impl Settings {
    /// Settings matching the behaviour of the stock Flandre firmware.
    pub fn legacy() -> Self {
        Self {
            pending_policy: PendingPolicy::SingleSlot,
            modifier_release: ModifierRelease::OnKeyRelease,
            chord_release: ChordRelease::Forward,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tapping_term_ms == 0 {
            return Err(ConfigError::ZeroTappingTerm);
        }
        if self.tapping_term_ms > MAX_TAPPING_TERM_MS {
            return Err(ConfigError::TappingTermTooLong(self.tapping_term_ms));
        }
        Ok(())
    }
}
