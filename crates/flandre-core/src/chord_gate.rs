use crate::mode::ModeController;
use crate::output::Reporter;
use tracing::debug;

/// One of the four keys of the mode switch combo (`"(!?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordBit {
    DoubleQuote,
    OpenParen,
    Exclaim,
    Question,
}

pub const CHORD_KEYS: [ChordBit; 4] = [
    ChordBit::DoubleQuote,
    ChordBit::OpenParen,
    ChordBit::Exclaim,
    ChordBit::Question,
];

impl ChordBit {
    pub const fn index(self) -> u8 {
        match self {
            ChordBit::DoubleQuote => 0,
            ChordBit::OpenParen => 1,
            ChordBit::Exclaim => 2,
            ChordBit::Question => 3,
        }
    }

    pub const fn mask(self) -> u8 {
        1 << self.index()
    }
}

/// Bits of the combo keys that are down and not yet consumed by a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChordMask(u8);

impl ChordMask {
    pub const COMBO: ChordMask = ChordMask(0b1111);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, bit: ChordBit) -> bool {
        self.0 & bit.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, bit: ChordBit) {
        self.0 |= bit.mask();
    }

    fn remove(&mut self, bit: ChordBit) {
        self.0 &= !bit.mask();
    }
}

#[derive(Debug, Default)]
pub struct ChordGate {
    mask: ChordMask,
}

impl ChordGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self) -> ChordMask {
        self.mask
    }

    /// Track a combo key transition. Returns `false` when the event completed
    /// the combo and must not be processed further.
    pub fn handle(
        &mut self,
        bit: ChordBit,
        pressed: bool,
        mode: &mut ModeController,
        out: &mut impl Reporter,
    ) -> bool {
        if pressed {
            self.mask.insert(bit);
            if self.mask == ChordMask::COMBO {
                debug!("Chord: combo complete on {:?}", bit);
                self.mask = ChordMask::empty();
                mode.toggle(out);
                return false;
            }
            debug!("Chord: {:?} down, mask={:04b}", bit, self.mask.bits());
        } else {
            // Re-arms this key regardless of whether it was part of a
            // completed combo.
            self.mask.remove(bit);
        }
        true
    }

    pub(crate) fn reset(&mut self) {
        self.mask = ChordMask::empty();
    }
}
