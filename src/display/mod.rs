// Display module - Video memory to window pixels
//
// This module provides:
// - The 8-color palette and its RGB332 packing
// - Bit-plane video memory access and the decoder
// - Frame change detection and truecolor expansion
// - The `Screen` pipeline and its host surfaces (pixels window, headless)

pub mod decoder;
pub mod differ;
pub mod expander;
pub mod framebuffer;
pub mod palette;
pub mod screen;
pub mod surface;
pub mod vram;
pub mod window;

pub use decoder::VramDecoder;
pub use differ::{FrameChange, FrameDiffer};
pub use expander::ColorExpander;
pub use framebuffer::{IndexBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use palette::{expand_rgb332, PALETTE, RGB332_MAP};
pub use screen::{RenderOutcome, Screen};
pub use surface::{DisplaySurface, HeadlessSurface};
pub use vram::{BitPlanes, VideoCache, VideoMemory};
pub use window::{run, Machine, PixelsSurface, TerminalApp};
