// Input module - Host keyboard to emulated LK201 keyboard
//
// This module provides:
// - LK201 key codes
// - Host key translation with edge tracking
// - The bounded key queue read by the emulated machine
// - Host input sources (winit and scripted)

pub mod keycode;
pub mod queue;
pub mod source;
pub mod translator;

pub use keycode::VirtualKey;
pub use queue::{KeyQueue, SharedKeyQueue};
pub use source::{HostEvent, InputSource, ScriptedInput, WinitInput};
pub use translator::{KeyBitmap, KeyboardTranslator, KEY_TABLE};
