// Menu module - Reserved-chord detection and the menu filter seam
//
// Ctrl+F1 opens the emulator's configuration menu. The chord is detected
// both from discrete key events and from the periodic keyboard scan; a
// shared debounce timestamp keeps the two paths from toggling the menu
// twice for one press.

pub mod basic;

pub use basic::BasicMenu;

use crate::input::{KeyBitmap, VirtualKey};
use crate::overlay::{Overlay, COLUMNS, ROWS};
use std::time::{Duration, Instant};
use tracing::debug;
use winit::keyboard::{KeyCode, ModifiersState};

/// Default minimum time between two menu activations
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

/// Codes injected to wake the menu
pub const WAKE_SEQUENCE: [VirtualKey; 3] =
    [VirtualKey::CTRL, VirtualKey::PRINT, VirtualKey::ALL_UPS];

/// Menu size in overlay cells
pub const MENU_WIDTH: usize = 38;
pub const MENU_HEIGHT: usize = 18;

/// The external menu subsystem
///
/// Every translated key passes through `filter` while the screen is open.
/// The filter may draw into the overlay and returns the code to forward to
/// the machine, if any.
pub trait MenuHost {
    fn is_active(&self) -> bool;

    /// Return to the initial, waiting state
    fn reset(&mut self);

    fn filter(&mut self, key: VirtualKey, overlay: &mut Overlay) -> Option<VirtualKey>;

    /// Whether the user asked for the keyboard state to be reset since the
    /// last call; the terminal then forgets held keys and pending codes
    fn take_keyboard_reset(&mut self) -> bool {
        false
    }
}

/// Menu host that forwards every key unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMenu;

impl MenuHost for NoMenu {
    fn is_active(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    fn filter(&mut self, key: VirtualKey, _overlay: &mut Overlay) -> Option<VirtualKey> {
        Some(key)
    }
}

/// Menu state as seen from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    MenuActive,
}

impl MenuState {
    pub fn of<M: MenuHost + ?Sized>(menu: &M) -> Self {
        if menu.is_active() {
            MenuState::MenuActive
        } else {
            MenuState::Idle
        }
    }
}

/// Top-left overlay cell of the menu
pub fn menu_origin(fullscreen: bool) -> (usize, usize) {
    if fullscreen {
        ((COLUMNS - MENU_WIDTH) / 2, (ROWS - MENU_HEIGHT) / 2)
    } else {
        (24, 2)
    }
}

/// Debounced detector for the menu chord
#[derive(Debug)]
pub struct MenuInterceptor {
    cooldown: Duration,
    last_trigger: Option<Instant>,
    chord_held: bool,
    activations: u64,
}

impl MenuInterceptor {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_trigger: None,
            chord_held: false,
            activations: 0,
        }
    }

    /// Whether a key press is the menu chord: Ctrl+F1, no Shift, no Alt
    pub fn is_chord(key: KeyCode, modifiers: ModifiersState) -> bool {
        key == KeyCode::F1
            && modifiers.control_key()
            && !modifiers.shift_key()
            && !modifiers.alt_key()
    }

    /// Handle the chord seen as a key event
    ///
    /// The caller swallows the key whatever the result. Returns whether the
    /// menu should be woken.
    pub fn chord_pressed(&mut self, menu_active: bool, now: Instant) -> bool {
        self.chord_held = true;
        self.try_trigger(menu_active, now)
    }

    /// Check the keyboard snapshot for a newly held chord
    pub fn scan_chord(
        &mut self,
        keys: &KeyBitmap,
        modifiers: ModifiersState,
        menu_active: bool,
        now: Instant,
    ) -> bool {
        let ctrl = keys.is_key_down(KeyCode::ControlLeft) || keys.is_key_down(KeyCode::ControlRight);
        let held = ctrl
            && keys.is_key_down(KeyCode::F1)
            && !modifiers.shift_key()
            && !modifiers.alt_key();
        let newly_held = held && !self.chord_held;
        self.chord_held = held;

        newly_held && self.try_trigger(menu_active, now)
    }

    /// Fire if the menu is idle and the cooldown has passed
    pub fn try_trigger(&mut self, menu_active: bool, now: Instant) -> bool {
        if menu_active {
            return false;
        }
        if let Some(last) = self.last_trigger {
            if now.saturating_duration_since(last) < self.cooldown {
                debug!("menu chord ignored, within cooldown");
                return false;
            }
        }

        self.last_trigger = Some(now);
        self.activations += 1;
        debug!("menu chord triggered (activation {})", self.activations);
        true
    }

    /// Forget that the chord is held, e.g. after focus loss
    pub fn release_chord(&mut self) {
        self.chord_held = false;
    }

    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for MenuInterceptor {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
