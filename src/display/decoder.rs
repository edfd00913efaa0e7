// VRAM decoder - Bit-planes to packed RGB332 pixels
//
// This is the hottest loop of the backend: it runs for every candidate
// frame. The three plane words of a 16-pixel run are fetched once and then
// shifted through, one pixel per bit.

use super::framebuffer::IndexBuffer;
use super::palette::RGB332_MAP;
use super::vram::{word_address, VideoMemory, PIXELS_PER_WORD, WORDS_PER_ROW};
use std::ops::Range;

/// Expands video memory into an index buffer
#[derive(Debug, Default, Clone, Copy)]
pub struct VramDecoder;

impl VramDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode every displayed row of `out`
    pub fn decode<V: VideoMemory + ?Sized>(&self, vram: &V, out: &mut IndexBuffer) {
        let rows = 0..out.height();
        self.decode_region(vram, out, rows, 0..WORDS_PER_ROW);
    }

    /// Decode a rectangle given as a row range and a word-column range
    ///
    /// Rows must lie inside `out`; word columns beyond the row are ignored.
    pub fn decode_region<V: VideoMemory + ?Sized>(
        &self,
        vram: &V,
        out: &mut IndexBuffer,
        rows: Range<usize>,
        words: Range<usize>,
    ) {
        debug_assert!(rows.end <= out.height(), "row range {:?} exceeds buffer", rows);
        let words = words.start.min(WORDS_PER_ROW)..words.end.min(WORDS_PER_ROW);

        for y in rows {
            let row = out.row_mut(y);
            for column in words.clone() {
                let [w0, w1, w2] = vram.plane_words(word_address(y, column));
                let run = &mut row[column * PIXELS_PER_WORD..(column + 1) * PIXELS_PER_WORD];
                decode_word(w0, w1, w2, run);
            }
        }
    }
}

#[inline(always)]
fn decode_word(w0: u16, w1: u16, w2: u16, run: &mut [u8]) {
    for (bit, pixel) in run.iter_mut().enumerate() {
        let index = ((w0 >> bit) & 1) | (((w1 >> bit) & 1) << 1) | (((w2 >> bit) & 1) << 2);
        *pixel = RGB332_MAP[index as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::SCREEN_HEIGHT;
    use crate::display::vram::BitPlanes;

    #[test]
    fn test_decode_uniform_index() {
        let mut planes = BitPlanes::new();
        planes.fill(5);
        let mut out = IndexBuffer::new(SCREEN_HEIGHT);

        VramDecoder::new().decode(&planes, &mut out);

        assert!(out.as_slice().iter().all(|&p| p == RGB332_MAP[5]));
    }

    #[test]
    fn test_decode_bit_order_is_lsb_first() {
        let mut planes = BitPlanes::new();
        // Pixel 0 red, pixel 15 blue in the first word of row 3
        planes.set_word(0, word_address(3, 0), 0x0001);
        planes.set_word(2, word_address(3, 0), 0x8000);
        let mut out = IndexBuffer::new(SCREEN_HEIGHT);

        VramDecoder::new().decode(&planes, &mut out);

        assert_eq!(out.get_pixel(0, 3), RGB332_MAP[1]);
        assert_eq!(out.get_pixel(15, 3), RGB332_MAP[4]);
        assert_eq!(out.get_pixel(1, 3), RGB332_MAP[0]);
    }

    #[test]
    fn test_decode_only_produces_palette_values() {
        let mut planes = BitPlanes::new();
        let mut seed: u32 = 0x1234_5678;
        for plane in 0..3 {
            for address in 0..WORDS_PER_ROW * SCREEN_HEIGHT {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
                planes.set_word(plane, address, (seed >> 8) as u16);
            }
        }
        let mut out = IndexBuffer::new(SCREEN_HEIGHT);

        VramDecoder::new().decode(&planes, &mut out);

        assert!(out.as_slice().iter().all(|p| RGB332_MAP.contains(p)));
    }

    #[test]
    fn test_decode_region_leaves_rest_untouched() {
        let mut planes = BitPlanes::new();
        planes.fill(7);
        let mut out = IndexBuffer::new(8);

        VramDecoder::new().decode_region(&planes, &mut out, 2..4, 1..2);

        assert_eq!(out.get_pixel(16, 2), 0xFF);
        assert_eq!(out.get_pixel(31, 3), 0xFF);
        assert_eq!(out.get_pixel(15, 2), 0x00);
        assert_eq!(out.get_pixel(32, 2), 0x00);
        assert_eq!(out.get_pixel(16, 4), 0x00);
    }
}
