use crate::chord_gate::{ChordBit, CHORD_KEYS};
use crate::types::{KeyCode, KeyId, Layer};
use std::collections::HashMap;
use thiserror::Error;

pub const DQT_SQH: KeyId = KeyId::new(0x7700); // double quote tap, single quote hold
pub const OPT_CPH: KeyId = KeyId::new(0x7701); // open paren tap, close paren hold
pub const EMT_SMH: KeyId = KeyId::new(0x7702); // exclamation tap, semicolon hold
pub const QMT_CLH: KeyId = KeyId::new(0x7703); // question mark tap, colon hold
pub const PDT_CMH: KeyId = KeyId::new(0x7704); // period tap, comma hold
/// Momentary number overlay. Active in both modes; the mode chord clears it
/// along with every other layer.
pub const MO_NUMBER: KeyId = KeyId::new(0x7710);

/// A key bound to two actions, disambiguated by press duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapHoldBinding {
    pub tap: KeyCode,
    pub hold: KeyCode,
}

impl TapHoldBinding {
    pub const fn new(tap: KeyCode, hold: KeyCode) -> Self {
        Self { tap, hold }
    }
}

/// What a key does when it reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Not handled here; the event continues to the regular keymap.
    Simple,
    TapHold(TapHoldBinding),
    /// Tap-hold key that also takes part in the mode switch chord.
    ChordMember {
        bit: ChordBit,
        binding: TapHoldBinding,
    },
    /// Overlay active while the key is held.
    Momentary(Layer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("chord bit {0} is already bound to key {1:#06x}")]
    ChordBitTaken(u8, u16),
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    roles: HashMap<KeyId, KeyRole>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Flandre layout: four chord-member punctuation keys, the
    /// period/comma key and the number overlay key.
    pub fn flandre() -> Self {
        let mut km = Self::new();
        let members = [
            (DQT_SQH, KeyCode::DoubleQuote, KeyCode::Quote),
            (OPT_CPH, KeyCode::LeftParen, KeyCode::RightParen),
            (EMT_SMH, KeyCode::Exclaim, KeyCode::Semicolon),
            (QMT_CLH, KeyCode::Question, KeyCode::Colon),
        ];
        for ((key, tap, hold), bit) in members.into_iter().zip(CHORD_KEYS) {
            km.roles.insert(
                key,
                KeyRole::ChordMember {
                    bit,
                    binding: TapHoldBinding::new(tap, hold),
                },
            );
        }
        km.roles.insert(
            PDT_CMH,
            KeyRole::TapHold(TapHoldBinding::new(KeyCode::Period, KeyCode::Comma)),
        );
        km.roles.insert(MO_NUMBER, KeyRole::Momentary(Layer::Number));
        tracing::info!("Keymap: Flandre layout with {} keys.", km.roles.len());
        km
    }

    /// Bind `key`, replacing any previous role for it.
    ///
    /// A chord bit may only be owned by one key at a time.
    pub fn insert(&mut self, key: KeyId, role: KeyRole) -> Result<(), KeymapError> {
        if let KeyRole::ChordMember { bit, .. } = role {
            if let Some(owner) = self.chord_owner(bit) {
                if owner != key {
                    return Err(KeymapError::ChordBitTaken(bit.index(), owner.code));
                }
            }
        }
        self.roles.insert(key, role);
        Ok(())
    }

    /// Role for `key`; unmapped keys are `Simple`.
    pub fn role(&self, key: KeyId) -> KeyRole {
        self.roles.get(&key).copied().unwrap_or(KeyRole::Simple)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn chord_members(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.roles.iter().filter_map(|(k, r)| match r {
            KeyRole::ChordMember { .. } => Some(*k),
            _ => None,
        })
    }

    fn chord_owner(&self, bit: ChordBit) -> Option<KeyId> {
        self.roles.iter().find_map(|(k, r)| match r {
            KeyRole::ChordMember { bit: b, .. } if *b == bit => Some(*k),
            _ => None,
        })
    }
}

/// Resolve a script key name to its identity.
pub fn key_name_to_id(name: &str) -> Option<KeyId> {
    match name.to_ascii_lowercase().as_str() {
        "dq" | "dqt_sqh" => Some(DQT_SQH),
        "op" | "opt_cph" => Some(OPT_CPH),
        "em" | "emt_smh" => Some(EMT_SMH),
        "qm" | "qmt_clh" => Some(QMT_CLH),
        "pd" | "pdt_cmh" => Some(PDT_CMH),
        "num" | "mo_number" => Some(MO_NUMBER),
        _ => None,
    }
}
