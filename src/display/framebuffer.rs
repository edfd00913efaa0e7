// Index buffer - One packed RGB332 byte per screen pixel
//
// The decoder overwrites the whole buffer every candidate frame. The buffer
// is allocated when the screen opens and reallocated when the number of
// displayed rows changes.

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 1024;

/// Default number of displayed rows
pub const SCREEN_HEIGHT: usize = 240;

/// Packed-color frame produced by the decoder
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl IndexBuffer {
    /// Create a black buffer of `height` rows
    pub fn new(height: usize) -> Self {
        Self {
            width: SCREEN_WIDTH,
            height,
            pixels: vec![0; SCREEN_WIDTH * height],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for a new row count, clearing the contents
    pub fn resize(&mut self, height: usize) {
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(self.width * height, 0);
        self.pixels.shrink_to_fit();
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x]
    }

    /// Fill the buffer with a packed color
    pub fn clear(&mut self, packed: u8) {
        self.pixels.fill(packed);
    }

    /// Raw packed pixels, row-major
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw packed pixels
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Mutable access to one row
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }
}
