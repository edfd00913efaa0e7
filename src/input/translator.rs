// Keyboard translator - Host keys to LK201 key codes
//
// Host key events arrive either as discrete press/release events or as a
// snapshot of the whole keyboard. The translator maps keys through a static
// table and keeps a per-key bitmap of the last known state, so that modifier
// codes are only emitted on a real up/down transition.

use super::keycode::VirtualKey;
use winit::keyboard::KeyCode;

/// Static host-to-LK201 mapping
///
/// The position of a key in this table is its index in a `KeyBitmap`.
pub const KEY_TABLE: &[(KeyCode, VirtualKey)] = &[
    // Function keys
    (KeyCode::Escape, VirtualKey::HOLD),
    (KeyCode::F1, VirtualKey::PRINT),
    (KeyCode::F2, VirtualKey::SETUP),
    (KeyCode::F3, VirtualKey::F4),
    (KeyCode::F4, VirtualKey::BREAK),
    (KeyCode::F5, VirtualKey::INTERRUPT),
    (KeyCode::F6, VirtualKey::RESUME),
    (KeyCode::F7, VirtualKey::CANCEL),
    (KeyCode::F8, VirtualKey::MAIN),
    (KeyCode::F9, VirtualKey::EXIT),
    (KeyCode::F10, VirtualKey::ESC),
    (KeyCode::F11, VirtualKey::BS),
    (KeyCode::F12, VirtualKey::LF),
    (KeyCode::NumLock, VirtualKey::ADD_OPTIONS),
    (KeyCode::Pause, VirtualKey::DO),
    (KeyCode::PrintScreen, VirtualKey::HELP),
    (KeyCode::ScrollLock, VirtualKey::LOCK),
    // Editing keypad
    (KeyCode::Insert, VirtualKey::INSERT),
    (KeyCode::Delete, VirtualKey::REMOVE),
    (KeyCode::Home, VirtualKey::FIND),
    (KeyCode::End, VirtualKey::PREV),
    (KeyCode::PageUp, VirtualKey::SELECT),
    (KeyCode::PageDown, VirtualKey::NEXT),
    (KeyCode::Space, VirtualKey::SPACE),
    (KeyCode::Backspace, VirtualKey::DEL),
    (KeyCode::Enter, VirtualKey::RETURN),
    (KeyCode::Tab, VirtualKey::TAB),
    (KeyCode::ArrowUp, VirtualKey::UP),
    (KeyCode::ArrowDown, VirtualKey::DOWN),
    (KeyCode::ArrowLeft, VirtualKey::LEFT),
    (KeyCode::ArrowRight, VirtualKey::RIGHT),
    // Numeric keypad, sharing the main keyboard digits
    (KeyCode::Numpad0, VirtualKey::D0),
    (KeyCode::Numpad1, VirtualKey::D1),
    (KeyCode::Numpad2, VirtualKey::D2),
    (KeyCode::Numpad3, VirtualKey::D3),
    (KeyCode::Numpad4, VirtualKey::D4),
    (KeyCode::Numpad5, VirtualKey::D5),
    (KeyCode::Numpad6, VirtualKey::D6),
    (KeyCode::Numpad7, VirtualKey::D7),
    (KeyCode::Numpad8, VirtualKey::D8),
    (KeyCode::Numpad9, VirtualKey::D9),
    (KeyCode::NumpadMultiply, VirtualKey::PF3),
    (KeyCode::NumpadAdd, VirtualKey::PF4),
    (KeyCode::NumpadSubtract, VirtualKey::MINUS),
    (KeyCode::NumpadDecimal, VirtualKey::PERIOD),
    (KeyCode::NumpadDivide, VirtualKey::SLASH),
    (KeyCode::NumpadEnter, VirtualKey::RETURN),
    // Modifiers
    (KeyCode::CapsLock, VirtualKey::LOCK),
    (KeyCode::ShiftLeft, VirtualKey::SHIFT),
    (KeyCode::ShiftRight, VirtualKey::SHIFT),
    (KeyCode::ControlLeft, VirtualKey::CTRL),
    (KeyCode::ControlRight, VirtualKey::CTRL),
    (KeyCode::AltLeft, VirtualKey::COMPOSE),
    (KeyCode::AltRight, VirtualKey::COMPOSE),
    (KeyCode::SuperLeft, VirtualKey::COMPOSE),
    (KeyCode::SuperRight, VirtualKey::COMPOSE),
    // Punctuation
    (KeyCode::Minus, VirtualKey::MINUS),
    (KeyCode::Equal, VirtualKey::EQUAL),
    (KeyCode::BracketLeft, VirtualKey::LEFT_BRACKET),
    (KeyCode::BracketRight, VirtualKey::RIGHT_BRACKET),
    (KeyCode::Semicolon, VirtualKey::SEMICOLON),
    (KeyCode::Quote, VirtualKey::QUOTE),
    (KeyCode::Backslash, VirtualKey::BACKSLASH),
    (KeyCode::Comma, VirtualKey::COMMA),
    (KeyCode::Period, VirtualKey::PERIOD),
    (KeyCode::Slash, VirtualKey::SLASH),
    (KeyCode::Backquote, VirtualKey::TICK),
    // Letters
    (KeyCode::KeyA, VirtualKey::A),
    (KeyCode::KeyB, VirtualKey::B),
    (KeyCode::KeyC, VirtualKey::C),
    (KeyCode::KeyD, VirtualKey::D),
    (KeyCode::KeyE, VirtualKey::E),
    (KeyCode::KeyF, VirtualKey::F),
    (KeyCode::KeyG, VirtualKey::G),
    (KeyCode::KeyH, VirtualKey::H),
    (KeyCode::KeyI, VirtualKey::I),
    (KeyCode::KeyJ, VirtualKey::J),
    (KeyCode::KeyK, VirtualKey::K),
    (KeyCode::KeyL, VirtualKey::L),
    (KeyCode::KeyM, VirtualKey::M),
    (KeyCode::KeyN, VirtualKey::N),
    (KeyCode::KeyO, VirtualKey::O),
    (KeyCode::KeyP, VirtualKey::P),
    (KeyCode::KeyQ, VirtualKey::Q),
    (KeyCode::KeyR, VirtualKey::R),
    (KeyCode::KeyS, VirtualKey::S),
    (KeyCode::KeyT, VirtualKey::T),
    (KeyCode::KeyU, VirtualKey::U),
    (KeyCode::KeyV, VirtualKey::V),
    (KeyCode::KeyW, VirtualKey::W),
    (KeyCode::KeyX, VirtualKey::X),
    (KeyCode::KeyY, VirtualKey::Y),
    (KeyCode::KeyZ, VirtualKey::Z),
    // Digits
    (KeyCode::Digit0, VirtualKey::D0),
    (KeyCode::Digit1, VirtualKey::D1),
    (KeyCode::Digit2, VirtualKey::D2),
    (KeyCode::Digit3, VirtualKey::D3),
    (KeyCode::Digit4, VirtualKey::D4),
    (KeyCode::Digit5, VirtualKey::D5),
    (KeyCode::Digit6, VirtualKey::D6),
    (KeyCode::Digit7, VirtualKey::D7),
    (KeyCode::Digit8, VirtualKey::D8),
    (KeyCode::Digit9, VirtualKey::D9),
];

const _: () = assert!(KEY_TABLE.len() <= KeyBitmap::CAPACITY);

/// Position of `key` in `KEY_TABLE`
pub fn key_index(key: KeyCode) -> Option<usize> {
    KEY_TABLE.iter().position(|&(k, _)| k == key)
}

/// Host keys whose release is reported as ALL_UPS
pub fn is_host_modifier(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::ShiftLeft
            | KeyCode::ShiftRight
            | KeyCode::ControlLeft
            | KeyCode::ControlRight
            | KeyCode::AltLeft
            | KeyCode::AltRight
            | KeyCode::SuperLeft
            | KeyCode::SuperRight
    )
}

/// One down/up bit per entry of `KEY_TABLE`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBitmap {
    words: [u64; 2],
}

impl KeyBitmap {
    pub const CAPACITY: usize = 128;

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        (self.words[index / 64] >> (index % 64)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize, down: bool) {
        let bit = 1u64 << (index % 64);
        if down {
            self.words[index / 64] |= bit;
        } else {
            self.words[index / 64] &= !bit;
        }
    }

    /// Whether a host key is down; unmapped keys are never down
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        key_index(key).is_some_and(|i| self.get(i))
    }

    /// Record a host key, ignoring unmapped keys
    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if let Some(i) = key_index(key) {
            self.set(i, down);
        }
    }

    pub fn clear(&mut self) {
        self.words = [0; 2];
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

/// Maps host key events to LK201 codes and tracks key edges
#[derive(Debug, Default)]
pub struct KeyboardTranslator {
    tracked: KeyBitmap,
}

impl KeyboardTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a host key, or `None` if it has no LK201 equivalent
    pub fn translate(key: KeyCode) -> Option<VirtualKey> {
        KEY_TABLE
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, code)| code)
    }

    /// Handle a key press
    ///
    /// Shift and Ctrl are only reported on an up-to-down edge; other keys
    /// are reported on every press, auto-repeat included.
    pub fn key_down(&mut self, key: KeyCode, out: &mut Vec<VirtualKey>) {
        let Some(index) = key_index(key) else {
            return;
        };
        let (_, code) = KEY_TABLE[index];
        let was_down = self.tracked.get(index);
        self.tracked.set(index, true);

        if !code.is_modifier() || !was_down {
            out.push(code);
        }
    }

    /// Handle a key release
    ///
    /// Releasing a modifier that was down reports ALL_UPS.
    pub fn key_up(&mut self, key: KeyCode, out: &mut Vec<VirtualKey>) {
        let Some(index) = key_index(key) else {
            return;
        };
        let was_down = self.tracked.get(index);
        self.tracked.set(index, false);

        if was_down && is_host_modifier(key) {
            out.push(VirtualKey::ALL_UPS);
        }
    }

    /// Record a key state without reporting anything
    pub fn track(&mut self, key: KeyCode, down: bool) {
        self.tracked.set_key(key, down);
    }

    /// Bring tracked state up to date with a full keyboard snapshot
    ///
    /// Newly pressed Shift/Ctrl keys report their code; newly released
    /// modifiers report a single ALL_UPS.
    pub fn scan(&mut self, snapshot: &KeyBitmap, out: &mut Vec<VirtualKey>) {
        if *snapshot == self.tracked {
            return;
        }

        let mut released = false;
        for (index, &(key, code)) in KEY_TABLE.iter().enumerate() {
            let was_down = self.tracked.get(index);
            let is_down = snapshot.get(index);
            if was_down == is_down {
                continue;
            }
            if is_down && code.is_modifier() {
                out.push(code);
            } else if !is_down && is_host_modifier(key) {
                released = true;
            }
        }
        if released {
            out.push(VirtualKey::ALL_UPS);
        }

        self.tracked = snapshot.clone();
    }

    /// Forget all held keys without reporting anything
    pub fn reset(&mut self) {
        self.tracked.clear();
    }

    /// Forget all held keys and report ALL_UPS
    pub fn focus_lost(&mut self, out: &mut Vec<VirtualKey>) {
        self.tracked.clear();
        out.push(VirtualKey::ALL_UPS);
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.tracked.is_key_down(key)
    }

    pub fn tracked(&self) -> &KeyBitmap {
        &self.tracked
    }
}
