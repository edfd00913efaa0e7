// Pro 350 terminal library
// Display and keyboard backend for a DEC Professional 350 emulator

// Public modules
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod menu;
pub mod overlay;
pub mod pacer;
pub mod terminal;

// Re-export main types for convenience
pub use config::TerminalConfig;
pub use display::{
    BitPlanes, DisplaySurface, HeadlessSurface, Machine, Screen, VideoCache, VideoMemory,
};
pub use error::{ConfigError, Result, TerminalError};
pub use input::{HostEvent, InputSource, KeyboardTranslator, SharedKeyQueue, VirtualKey};
pub use menu::{BasicMenu, MenuHost, MenuInterceptor, MenuState};
pub use overlay::{Overlay, OverlayStyle};
pub use pacer::FramePacer;
pub use terminal::{ServiceStatus, Terminal};
