// Video memory - Bit-plane view of the emulated display memory
//
// The emulation core owns the video memory. This module defines the read
// interface the decoder uses, the write-side cache interface the overlay uses
// to report dirtied words, and `BitPlanes`, a plain in-memory implementation
// used by the demo machine, tests and benchmarks.

/// Number of bit-planes in video memory
pub const NUM_PLANES: usize = 3;

/// Pixels stored in one video memory word
pub const PIXELS_PER_WORD: usize = 16;

/// Words per scanline (1024 pixels)
pub const WORDS_PER_ROW: usize = 64;

/// Rows held in video memory (more than are displayed)
pub const MEMORY_ROWS: usize = 256;

/// Word address of a row and word column
///
/// The address is `(row << 6) | column`; the core is free to apply its own
/// scroll mapping when it resolves the address.
#[inline]
pub fn word_address(row: usize, column: usize) -> usize {
    (row << 6) | (column & (WORDS_PER_ROW - 1))
}

/// Read access to the three bit-planes
pub trait VideoMemory {
    /// Fetch the word of `plane` (0..3) at `address`
    fn plane_word(&self, plane: usize, address: usize) -> u16;

    /// Fetch the words of all three planes at `address`
    #[inline]
    fn plane_words(&self, address: usize) -> [u16; NUM_PLANES] {
        [
            self.plane_word(0, address),
            self.plane_word(1, address),
            self.plane_word(2, address),
        ]
    }
}

/// Pixel-validity cache kept by the emulation core
///
/// The overlay notifies the core whenever it draws over pixels whose cache
/// entry is keyed by a video memory word.
pub trait VideoCache {
    /// Mark the cache entry for `address` invalid
    fn invalidate(&mut self, address: usize);

    /// Mark every cache entry invalid
    fn invalidate_all(&mut self);
}

/// In-memory bit-planes
#[derive(Debug, Clone)]
pub struct BitPlanes {
    planes: [Vec<u16>; NUM_PLANES],
}

impl BitPlanes {
    /// Create zeroed planes covering all of video memory
    pub fn new() -> Self {
        let size = WORDS_PER_ROW * MEMORY_ROWS;
        Self {
            planes: [vec![0; size], vec![0; size], vec![0; size]],
        }
    }

    /// Set the color index of a single pixel
    ///
    /// # Panics
    /// Panics if the pixel lies outside video memory
    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        assert!(x < WORDS_PER_ROW * PIXELS_PER_WORD, "x {} out of bounds", x);
        assert!(y < MEMORY_ROWS, "y {} out of bounds", y);

        let address = word_address(y, x / PIXELS_PER_WORD);
        let bit = 1u16 << (x % PIXELS_PER_WORD);
        for (plane, words) in self.planes.iter_mut().enumerate() {
            if (index >> plane) & 1 != 0 {
                words[address] |= bit;
            } else {
                words[address] &= !bit;
            }
        }
    }

    /// Fill every pixel with one color index
    pub fn fill(&mut self, index: u8) {
        for (plane, words) in self.planes.iter_mut().enumerate() {
            let word = if (index >> plane) & 1 != 0 { 0xFFFF } else { 0 };
            words.fill(word);
        }
    }

    /// Write a raw plane word
    pub fn set_word(&mut self, plane: usize, address: usize, word: u16) {
        self.planes[plane][address] = word;
    }
}

impl Default for BitPlanes {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoMemory for BitPlanes {
    #[inline]
    fn plane_word(&self, plane: usize, address: usize) -> u16 {
        self.planes[plane][address]
    }
}
