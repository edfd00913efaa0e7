// Color expander - Packed RGB332 to 24-bit truecolor
//
// Runs only when the differ reports a changed frame. The output buffer is a
// reusable scratch area: it grows to the size of the largest frame seen and
// is never shrunk, so steady-state frames do not allocate.

use super::palette::expand_rgb332;
use crate::error::{Result, TerminalError};

/// Bytes per truecolor pixel
pub const RGB_BYTES: usize = 3;

/// Expands packed frames into an RGB24 presentation buffer
#[derive(Debug, Default)]
pub struct ColorExpander {
    buffer: Vec<u8>,
    len: usize,
    expansions: u64,
    #[cfg(test)]
    fail_next_grow: bool,
}

impl ColorExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `packed` and return the RGB24 result
    ///
    /// # Errors
    /// Returns `TerminalError::OutOfMemory` if the scratch buffer cannot grow;
    /// the previous presentation buffer is left intact.
    pub fn expand(&mut self, packed: &[u8]) -> Result<&[u8]> {
        let size = packed.len() * RGB_BYTES;
        if size > self.buffer.len() {
            #[cfg(test)]
            if std::mem::take(&mut self.fail_next_grow) {
                return Err(TerminalError::OutOfMemory {
                    what: "presentation buffer",
                    bytes: size,
                });
            }
            self.buffer
                .try_reserve_exact(size - self.buffer.len())
                .map_err(|_| TerminalError::OutOfMemory {
                    what: "presentation buffer",
                    bytes: size,
                })?;
            self.buffer.resize(size, 0);
        }

        self.expansions += 1;
        for (&pixel, rgb) in packed.iter().zip(self.buffer.chunks_exact_mut(RGB_BYTES)) {
            rgb.copy_from_slice(&expand_rgb332(pixel));
        }
        self.len = size;

        Ok(&self.buffer[..size])
    }

    /// The most recent expansion
    pub fn output(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Number of times `expand` has run
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    /// Allocated scratch capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Release the scratch buffer
    pub fn release(&mut self) {
        self.buffer = Vec::new();
        self.len = 0;
    }

    /// Make the next growth of the scratch buffer fail
    #[cfg(test)]
    pub(crate) fn fail_next_grow(&mut self) {
        self.fail_next_grow = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::palette::{PALETTE, RGB332_MAP};

    #[test]
    fn test_expand_palette_entries() {
        let mut expander = ColorExpander::new();
        let rgb = expander.expand(&RGB332_MAP).unwrap();

        for (i, color) in PALETTE.iter().enumerate() {
            assert_eq!(&rgb[i * 3..i * 3 + 3], color);
        }
    }

    #[test]
    fn test_scratch_grows_but_never_shrinks() {
        let mut expander = ColorExpander::new();
        expander.expand(&[0xFF; 100]).unwrap();
        assert_eq!(expander.capacity(), 300);

        let rgb = expander.expand(&[0x00; 10]).unwrap();
        assert_eq!(rgb.len(), 30);
        assert_eq!(expander.capacity(), 300);
        assert_eq!(expander.output().len(), 30);
    }

    #[test]
    fn test_failed_grow_keeps_previous_output() {
        let mut expander = ColorExpander::new();
        expander.expand(&[0xE0; 4]).unwrap();

        expander.fail_next_grow();
        let err = expander.expand(&[0x1C; 8]).unwrap_err();
        assert!(matches!(err, TerminalError::OutOfMemory { bytes: 24, .. }));
        assert_eq!(expander.output(), [255u8, 0, 0].repeat(4).as_slice());
        assert_eq!(expander.expansions(), 1);

        // The failure is not sticky
        assert_eq!(expander.expand(&[0x1C; 8]).unwrap().len(), 24);
    }

    #[test]
    fn test_counts_expansions() {
        let mut expander = ColorExpander::new();
        expander.expand(&[1]).unwrap();
        expander.expand(&[2]).unwrap();
        assert_eq!(expander.expansions(), 2);
    }
}
