// Screen - The display pipeline
//
// Video memory is decoded into packed pixels, compared with the previous
// frame, expanded to truecolor only when it changed, composited with the
// overlay and handed to the surface. All scratch buffers are allocated on
// open and reused frame after frame.

use super::decoder::VramDecoder;
use super::differ::FrameDiffer;
use super::expander::{ColorExpander, RGB_BYTES};
use super::framebuffer::{IndexBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use super::surface::DisplaySurface;
use super::vram::{VideoMemory, MEMORY_ROWS};
use crate::error::{Result, TerminalError};
use crate::overlay::Overlay;
use tracing::{debug, warn};

/// What a call to `Screen::render` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The screen is closed
    Closed,
    /// A new frame was uploaded and presented
    Uploaded,
    /// Nothing changed; the previous frame was presented again
    Presented,
    /// Scratch memory ran out; the frame was dropped
    Skipped,
}

/// Decode, diff, expand and present
#[derive(Debug)]
pub struct Screen {
    indices: IndexBuffer,
    decoder: VramDecoder,
    differ: FrameDiffer,
    expander: ColorExpander,
    composed: Vec<u8>,
    open: bool,
    frames: u64,
    skipped: u64,
}

impl Screen {
    /// Create a closed screen
    pub fn new() -> Self {
        Self {
            indices: IndexBuffer::new(0),
            decoder: VramDecoder::new(),
            differ: FrameDiffer::new(),
            expander: ColorExpander::new(),
            composed: Vec::new(),
            open: false,
            frames: 0,
            skipped: 0,
        }
    }

    /// Allocate buffers for `height` displayed rows
    ///
    /// # Panics
    /// Panics if `height` exceeds the rows held in video memory
    pub fn open(&mut self, height: usize) {
        assert!(height <= MEMORY_ROWS, "screen height {} exceeds video memory", height);
        self.indices = IndexBuffer::new(height);
        self.differ.invalidate();
        self.open = true;
        debug!("screen opened ({}x{})", SCREEN_WIDTH, height);
    }

    /// Change the displayed row count; the next frame is redrawn in full
    pub fn resize(&mut self, height: usize) {
        let height = height.min(MEMORY_ROWS);
        if height == self.indices.height() {
            self.differ.invalidate();
            return;
        }
        self.indices.resize(height);
        self.differ.invalidate();
        debug!("screen resized to {} rows", height);
    }

    /// Release every buffer; a no-op if already closed
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.indices = IndexBuffer::new(0);
        self.differ.release();
        self.expander.release();
        self.composed = Vec::new();
        self.open = false;
        debug!("screen closed after {} frames", self.frames);
    }

    /// Force the next frame to be treated as changed
    pub fn invalidate(&mut self) {
        self.differ.invalidate();
    }

    /// Blank the index buffer and the surface
    pub fn clear<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        self.indices.clear(0);
        self.differ.invalidate();
        surface.clear()
    }

    /// Run the pipeline for one frame
    ///
    /// # Arguments
    ///
    /// * `vram` - Video memory of the emulation core
    /// * `overlay` - Text layer blended over the frame when enabled
    /// * `surface` - Where the composed frame is uploaded and presented
    ///
    /// # Returns
    ///
    /// What was done with the frame. `Skipped` means scratch memory ran
    /// out; the frame is rebuilt on the next call even if video memory has
    /// not changed.
    ///
    /// # Errors
    ///
    /// Returns the surface's error if the upload or the present fails
    pub fn render<V, S>(
        &mut self,
        vram: &V,
        overlay: &mut Overlay,
        surface: &mut S,
    ) -> Result<RenderOutcome>
    where
        V: VideoMemory + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        if !self.open {
            return Ok(RenderOutcome::Closed);
        }

        self.decoder.decode(vram, &mut self.indices);
        let changed = self.differ.compare(self.indices.as_slice()).is_changed();

        if changed {
            if let Err(e) = self.expander.expand(self.indices.as_slice()) {
                return Ok(self.skip(e));
            }
        }

        let overlay_changed = overlay.take_composite_pending();
        if changed || overlay_changed {
            if let Err(e) = self.compose(overlay) {
                return Ok(self.skip(e));
            }
            surface.upload(&self.composed, self.indices.width(), self.indices.height())?;
            surface.present()?;
            self.frames += 1;
            return Ok(RenderOutcome::Uploaded);
        }

        surface.present()?;
        Ok(RenderOutcome::Presented)
    }

    fn compose(&mut self, overlay: &mut Overlay) -> Result<()> {
        let base = self.expander.output();
        if self.composed.capacity() < base.len() {
            self.composed
                .try_reserve_exact(base.len() - self.composed.len())
                .map_err(|_| TerminalError::OutOfMemory {
                    what: "composite buffer",
                    bytes: base.len(),
                })?;
        }
        self.composed.clear();
        self.composed.extend_from_slice(base);
        overlay.composite_onto(&mut self.composed, self.indices.width(), self.indices.height());
        Ok(())
    }

    fn skip(&mut self, error: TerminalError) -> RenderOutcome {
        warn!("dropping frame: {}", error);
        // The differ already holds this frame; forget it so it is retried
        self.differ.invalidate();
        self.skipped += 1;
        RenderOutcome::Skipped
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn height(&self) -> usize {
        self.indices.height()
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    /// Last truecolor frame, before compositing
    pub fn presentation(&self) -> &[u8] {
        self.expander.output()
    }

    /// Number of frames uploaded to the surface
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// How many times a frame has been expanded to truecolor
    pub fn expansions(&self) -> u64 {
        self.expander.expansions()
    }

    /// Presentation buffer size for a full default-height frame
    pub const fn default_frame_bytes() -> usize {
        SCREEN_WIDTH * SCREEN_HEIGHT * RGB_BYTES
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}
