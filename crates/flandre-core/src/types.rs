/// Physical key identity as delivered by the matrix scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId {
    pub code: u16,
}

impl KeyId {
    pub const fn new(code: u16) -> Self {
        Self { code }
    }
}

/// Press or release edge of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

impl KeyEdge {
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Down
        } else {
            Self::Up
        }
    }

    pub const fn is_down(self) -> bool {
        matches!(self, Self::Down)
    }
}

/// 16-bit wrapping millisecond counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp(pub u16);

impl Timestamp {
    /// Milliseconds from `earlier` to `self`, tolerating one counter wrap.
    pub const fn elapsed_since(self, earlier: Timestamp) -> u16 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Modifier keys, one HID report bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    LeftCtrl,
    LeftShift,
    LeftAlt,
    LeftGui,
    RightCtrl,
    RightShift,
    RightAlt,
    RightGui,
}

impl Modifier {
    pub const fn bit(self) -> u8 {
        match self {
            Modifier::LeftCtrl => 0x01,
            Modifier::LeftShift => 0x02,
            Modifier::LeftAlt => 0x04,
            Modifier::LeftGui => 0x08,
            Modifier::RightCtrl => 0x10,
            Modifier::RightShift => 0x20,
            Modifier::RightAlt => 0x40,
            Modifier::RightGui => 0x80,
        }
    }
}

/// Set of active modifiers packed the way the HID report carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, m: Modifier) -> bool {
        self.0 & m.bit() != 0
    }

    pub fn set(&mut self, m: Modifier, active: bool) {
        if active {
            self.0 |= m.bit();
        } else {
            self.0 &= !m.bit();
        }
    }
}

/// Logical action produced for the report stack.
///
/// Shifted symbols are separate codes; the transmission stack is responsible
/// for wrapping them in a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Quote,
    DoubleQuote,
    LeftParen,
    RightParen,
    Exclaim,
    Semicolon,
    Question,
    Colon,
    Period,
    Comma,
    Space,
    Enter,
    Backspace,
    Tab,
    Escape,
    Mod(Modifier),
}

impl KeyCode {
    /// The modifier this code drives, if it is a modifier.
    pub const fn modifier(self) -> Option<Modifier> {
        match self {
            KeyCode::Mod(m) => Some(m),
            _ => None,
        }
    }

    pub const fn is_modifier(self) -> bool {
        self.modifier().is_some()
    }
}

/// Keymap layers, numbered the way the layer stack indexes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Steno,
    Alpha,
    Number,
}

impl Layer {
    pub const fn index(self) -> u8 {
        match self {
            Layer::Steno => 0,
            Layer::Alpha => 1,
            Layer::Number => 2,
        }
    }
}
