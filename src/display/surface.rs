// Surface - The host rendering sink
//
// Any backend that can take an RGB24 frame and present it satisfies this
// interface. `PixelsSurface` (see `window`) draws into a winit window;
// `HeadlessSurface` keeps the last frame in memory for tests and tooling.

use crate::error::Result;

/// Host drawing surface
pub trait DisplaySurface {
    /// Upload a full RGB24 frame of `width` x `height` pixels
    fn upload(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<()>;

    /// Present the most recently uploaded frame
    fn present(&mut self) -> Result<()>;

    /// Fill the surface with black and present it
    fn clear(&mut self) -> Result<()>;

    /// Set the window title, if the surface has one
    fn set_title(&mut self, _title: &str) {}
}

/// In-memory surface
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    frame: Vec<u8>,
    width: usize,
    height: usize,
    uploads: u64,
    presents: u64,
    title: String,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last uploaded frame
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// RGB of one pixel of the last uploaded frame
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width + x) * 3;
        [
            self.frame[offset],
            self.frame[offset + 1],
            self.frame[offset + 2],
        ]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl DisplaySurface for HeadlessSurface {
    fn upload(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<()> {
        self.frame.clear();
        self.frame.extend_from_slice(rgb);
        self.width = width;
        self.height = height;
        self.uploads += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.frame.fill(0);
        self.present()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}
