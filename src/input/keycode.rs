// LK201 key codes
//
// The emulated keyboard reports one-byte key codes. Most keys send a single
// down code; the keyboard itself generates auto-repeat. Shift and Ctrl send
// their own code on press, and releasing them is signalled by ALL_UPS.

use std::fmt;

/// A key code of the emulated LK201 keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u8);

impl VirtualKey {
    // Function keys
    pub const HOLD: Self = Self(0x56);
    pub const PRINT: Self = Self(0x57);
    pub const SETUP: Self = Self(0x58);
    pub const F4: Self = Self(0x59);
    pub const BREAK: Self = Self(0x5A);
    pub const INTERRUPT: Self = Self(0x64);
    pub const RESUME: Self = Self(0x65);
    pub const CANCEL: Self = Self(0x66);
    pub const MAIN: Self = Self(0x67);
    pub const EXIT: Self = Self(0x68);
    pub const ESC: Self = Self(0x71);
    pub const BS: Self = Self(0x72);
    pub const LF: Self = Self(0x73);
    pub const ADD_OPTIONS: Self = Self(0x74);
    pub const HELP: Self = Self(0x7C);
    pub const DO: Self = Self(0x7D);

    // Editing keypad
    pub const FIND: Self = Self(0x8A);
    pub const INSERT: Self = Self(0x8B);
    pub const REMOVE: Self = Self(0x8C);
    pub const SELECT: Self = Self(0x8D);
    pub const PREV: Self = Self(0x8E);
    pub const NEXT: Self = Self(0x8F);

    // Numeric keypad
    pub const PF1: Self = Self(0xA1);
    pub const PF2: Self = Self(0xA2);
    pub const PF3: Self = Self(0xA3);
    pub const PF4: Self = Self(0xA4);

    // Cursor keys
    pub const LEFT: Self = Self(0xA7);
    pub const RIGHT: Self = Self(0xA8);
    pub const DOWN: Self = Self(0xA9);
    pub const UP: Self = Self(0xAA);

    // Modifiers and special codes
    pub const SHIFT: Self = Self(0xAE);
    pub const CTRL: Self = Self(0xAF);
    pub const LOCK: Self = Self(0xB0);
    pub const COMPOSE: Self = Self(0xB1);
    pub const ALL_UPS: Self = Self(0xB3);

    // Main keyboard
    pub const DEL: Self = Self(0xBC);
    pub const RETURN: Self = Self(0xBD);
    pub const TAB: Self = Self(0xBE);
    pub const TICK: Self = Self(0xBF);
    pub const D1: Self = Self(0xC0);
    pub const Q: Self = Self(0xC1);
    pub const A: Self = Self(0xC2);
    pub const Z: Self = Self(0xC3);
    pub const D2: Self = Self(0xC5);
    pub const W: Self = Self(0xC6);
    pub const S: Self = Self(0xC7);
    pub const X: Self = Self(0xC8);
    pub const D3: Self = Self(0xCB);
    pub const E: Self = Self(0xCC);
    pub const D: Self = Self(0xCD);
    pub const C: Self = Self(0xCE);
    pub const D4: Self = Self(0xD0);
    pub const R: Self = Self(0xD1);
    pub const F: Self = Self(0xD2);
    pub const V: Self = Self(0xD3);
    pub const SPACE: Self = Self(0xD4);
    pub const D5: Self = Self(0xD6);
    pub const T: Self = Self(0xD7);
    pub const G: Self = Self(0xD8);
    pub const B: Self = Self(0xD9);
    pub const D6: Self = Self(0xDB);
    pub const Y: Self = Self(0xDC);
    pub const H: Self = Self(0xDD);
    pub const N: Self = Self(0xDE);
    pub const D7: Self = Self(0xE0);
    pub const U: Self = Self(0xE1);
    pub const J: Self = Self(0xE2);
    pub const M: Self = Self(0xE3);
    pub const D8: Self = Self(0xE5);
    pub const I: Self = Self(0xE6);
    pub const K: Self = Self(0xE7);
    pub const COMMA: Self = Self(0xE8);
    pub const D9: Self = Self(0xEA);
    pub const O: Self = Self(0xEB);
    pub const L: Self = Self(0xEC);
    pub const PERIOD: Self = Self(0xED);
    pub const D0: Self = Self(0xEF);
    pub const P: Self = Self(0xF0);
    pub const SEMICOLON: Self = Self(0xF2);
    pub const SLASH: Self = Self(0xF3);
    pub const EQUAL: Self = Self(0xF5);
    pub const RIGHT_BRACKET: Self = Self(0xF6);
    pub const BACKSLASH: Self = Self(0xF7);
    pub const MINUS: Self = Self(0xF9);
    pub const LEFT_BRACKET: Self = Self(0xFA);
    pub const QUOTE: Self = Self(0xFB);

    /// Raw code byte
    pub fn code(self) -> u8 {
        self.0
    }

    /// Keys whose press is reported separately from ALL_UPS
    pub fn is_modifier(self) -> bool {
        self == Self::SHIFT || self == Self::CTRL
    }

    /// Unshifted character printed on the key cap, if any
    pub fn printable(self) -> Option<char> {
        #[rustfmt::skip]
        const PRINTABLE: [(VirtualKey, char); 48] = [
            (VirtualKey::A, 'a'), (VirtualKey::B, 'b'), (VirtualKey::C, 'c'),
            (VirtualKey::D, 'd'), (VirtualKey::E, 'e'), (VirtualKey::F, 'f'),
            (VirtualKey::G, 'g'), (VirtualKey::H, 'h'), (VirtualKey::I, 'i'),
            (VirtualKey::J, 'j'), (VirtualKey::K, 'k'), (VirtualKey::L, 'l'),
            (VirtualKey::M, 'm'), (VirtualKey::N, 'n'), (VirtualKey::O, 'o'),
            (VirtualKey::P, 'p'), (VirtualKey::Q, 'q'), (VirtualKey::R, 'r'),
            (VirtualKey::S, 's'), (VirtualKey::T, 't'), (VirtualKey::U, 'u'),
            (VirtualKey::V, 'v'), (VirtualKey::W, 'w'), (VirtualKey::X, 'x'),
            (VirtualKey::Y, 'y'), (VirtualKey::Z, 'z'),
            (VirtualKey::D0, '0'), (VirtualKey::D1, '1'), (VirtualKey::D2, '2'),
            (VirtualKey::D3, '3'), (VirtualKey::D4, '4'), (VirtualKey::D5, '5'),
            (VirtualKey::D6, '6'), (VirtualKey::D7, '7'), (VirtualKey::D8, '8'),
            (VirtualKey::D9, '9'),
            (VirtualKey::SPACE, ' '), (VirtualKey::COMMA, ','), (VirtualKey::PERIOD, '.'),
            (VirtualKey::SEMICOLON, ';'), (VirtualKey::SLASH, '/'), (VirtualKey::EQUAL, '='),
            (VirtualKey::MINUS, '-'), (VirtualKey::LEFT_BRACKET, '['),
            (VirtualKey::RIGHT_BRACKET, ']'), (VirtualKey::BACKSLASH, '\\'),
            (VirtualKey::QUOTE, '\''), (VirtualKey::TICK, '`'),
        ];
        PRINTABLE
            .iter()
            .find(|&&(key, _)| key == self)
            .map(|&(_, ch)| ch)
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LK201 {:#04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_class() {
        assert!(VirtualKey::SHIFT.is_modifier());
        assert!(VirtualKey::CTRL.is_modifier());
        assert!(!VirtualKey::COMPOSE.is_modifier());
        assert!(!VirtualKey::ALL_UPS.is_modifier());
    }

    #[test]
    fn test_printable() {
        assert_eq!(VirtualKey::A.printable(), Some('a'));
        assert_eq!(VirtualKey::D0.printable(), Some('0'));
        assert_eq!(VirtualKey::QUOTE.printable(), Some('\''));
        assert_eq!(VirtualKey::RETURN.printable(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(VirtualKey::ALL_UPS.to_string(), "LK201 0xb3");
    }
}
