// Input source - Host events as seen by the terminal
//
// The terminal never talks to the windowing system directly. An input source
// buffers host events between polls and keeps a snapshot of which mapped keys
// are currently down, which the translator scans every poll.

use super::translator::KeyBitmap;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// A host event relevant to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Key {
        key: KeyCode,
        pressed: bool,
        modifiers: ModifiersState,
    },
    FocusGained,
    FocusLost,
    Hidden,
    Shown,
    Quit,
}

/// Provider of host input
pub trait InputSource {
    /// Move all pending events into `out`, oldest first
    fn drain_events(&mut self, out: &mut Vec<HostEvent>);

    /// Current down/up state of every mapped key
    fn key_state(&self) -> &KeyBitmap;

    /// Current modifier state
    fn modifiers(&self) -> ModifiersState;
}

/// Input source fed from winit window events
#[derive(Debug, Default)]
pub struct WinitInput {
    events: Vec<HostEvent>,
    keys: KeyBitmap,
    modifiers: ModifiersState,
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a window event
    pub fn record(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                is_synthetic,
                ..
            } => {
                let pressed = *state == ElementState::Pressed;
                self.keys.set_key(*key, pressed);
                // Synthetic events mirror keys held across a focus change;
                // the snapshot picks them up on the next scan.
                if !is_synthetic {
                    self.events.push(HostEvent::Key {
                        key: *key,
                        pressed,
                        modifiers: self.modifiers,
                    });
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::Focused(true) => self.events.push(HostEvent::FocusGained),
            WindowEvent::Focused(false) => {
                self.keys.clear();
                self.modifiers = ModifiersState::empty();
                self.events.push(HostEvent::FocusLost);
            }
            WindowEvent::Occluded(true) => self.events.push(HostEvent::Hidden),
            WindowEvent::Occluded(false) => self.events.push(HostEvent::Shown),
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.events.push(HostEvent::Quit)
            }
            _ => {}
        }
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for WinitInput {
    fn drain_events(&mut self, out: &mut Vec<HostEvent>) {
        out.append(&mut self.events);
    }

    fn key_state(&self) -> &KeyBitmap {
        &self.keys
    }

    fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }
}

/// Input source driven by hand, for headless runs and tests
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: Vec<HostEvent>,
    keys: KeyBitmap,
    modifiers: ModifiersState,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn modifier_flag(key: KeyCode) -> ModifiersState {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => ModifiersState::SHIFT,
            KeyCode::ControlLeft | KeyCode::ControlRight => ModifiersState::CONTROL,
            KeyCode::AltLeft | KeyCode::AltRight => ModifiersState::ALT,
            KeyCode::SuperLeft | KeyCode::SuperRight => ModifiersState::SUPER,
            _ => ModifiersState::empty(),
        }
    }

    /// Press a key as a discrete event
    pub fn press(&mut self, key: KeyCode) {
        self.keys.set_key(key, true);
        self.modifiers.insert(Self::modifier_flag(key));
        self.events.push(HostEvent::Key {
            key,
            pressed: true,
            modifiers: self.modifiers,
        });
    }

    /// Release a key as a discrete event
    pub fn release(&mut self, key: KeyCode) {
        self.keys.set_key(key, false);
        self.modifiers.remove(Self::modifier_flag(key));
        self.events.push(HostEvent::Key {
            key,
            pressed: false,
            modifiers: self.modifiers,
        });
    }

    /// Change the snapshot without queueing an event
    pub fn hold(&mut self, key: KeyCode, down: bool) {
        self.keys.set_key(key, down);
        if down {
            self.modifiers.insert(Self::modifier_flag(key));
        } else {
            self.modifiers.remove(Self::modifier_flag(key));
        }
    }

    /// Lose focus; the host forgets every held key
    pub fn lose_focus(&mut self) {
        self.keys.clear();
        self.modifiers = ModifiersState::empty();
        self.events.push(HostEvent::FocusLost);
    }

    pub fn push(&mut self, event: HostEvent) {
        self.events.push(event);
    }
}

impl InputSource for ScriptedInput {
    fn drain_events(&mut self, out: &mut Vec<HostEvent>) {
        out.append(&mut self.events);
    }

    fn key_state(&self) -> &KeyBitmap {
        &self.keys
    }

    fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winit_focus_events() {
        let mut input = WinitInput::new();
        input.record(&WindowEvent::Focused(false));
        input.record(&WindowEvent::Focused(true));
        input.record(&WindowEvent::Occluded(true));
        input.record(&WindowEvent::CloseRequested);

        let mut events = Vec::new();
        input.drain_events(&mut events);
        assert_eq!(
            events,
            vec![
                HostEvent::FocusLost,
                HostEvent::FocusGained,
                HostEvent::Hidden,
                HostEvent::Quit
            ]
        );
        assert_eq!(input.pending(), 0);
    }

    #[test]
    fn test_scripted_modifiers() {
        let mut input = ScriptedInput::new();
        input.press(KeyCode::ControlLeft);
        input.press(KeyCode::F1);
        assert!(input.modifiers().control_key());
        assert!(input.key_state().is_key_down(KeyCode::F1));

        input.release(KeyCode::ControlLeft);
        assert!(!input.modifiers().control_key());

        let mut events = Vec::new();
        input.drain_events(&mut events);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            HostEvent::Key {
                key: KeyCode::F1,
                pressed: true,
                modifiers: ModifiersState::CONTROL,
            }
        );
    }

    #[test]
    fn test_scripted_focus_loss_clears_snapshot() {
        let mut input = ScriptedInput::new();
        input.hold(KeyCode::ShiftLeft, true);
        input.lose_focus();
        assert!(input.key_state().is_empty());
        assert!(input.modifiers().is_empty());
    }
}
