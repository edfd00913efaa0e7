// Overlay - Text layer drawn over the emulated display
//
// This module provides:
// - An 80x24 character grid of 12x10 glyph cells with its own color and
//   alpha planes
// - Replace and invert (XNOR) drawing, the latter used for highlighted text
// - Cursor-relative text placement
// - Blending of the text layer over the presentation buffer
//
// The overlay is opened and closed independently of the main display. While
// closed, every drawing operation is ignored.

pub mod font;

pub use font::{Font, GLYPH_HEIGHT, GLYPH_WIDTH};

use crate::display::vram::{word_address, VideoCache, MEMORY_ROWS, PIXELS_PER_WORD, WORDS_PER_ROW};
use tracing::{debug, warn};

/// Character columns
pub const COLUMNS: usize = 80;

/// Character rows
pub const ROWS: usize = 24;

/// Overlay width in pixels
pub const OVERLAY_WIDTH: usize = COLUMNS * GLYPH_WIDTH;

/// Overlay height in pixels
pub const OVERLAY_HEIGHT: usize = ROWS * GLYPH_HEIGHT;

/// Alpha of fully opaque pixels
pub const OPAQUE: u8 = 0xFF;

/// How a glyph is combined with what is already in its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Overwrite the cell with the glyph
    Replace,
    /// Toggle the glyph against the cell: background pixels swap roles
    Invert,
}

/// Horizontal placement of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Start at this column and remember it as the anchor
    Absolute(usize),
    /// Start at the last absolute column
    ContinueColumn,
    /// Start right after the previous run
    ContinueAfterLast,
}

/// Vertical placement of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Absolute(usize),
    /// The row below the previous run
    NextRow,
    /// The row of the previous run
    SameRow,
}

/// Position of the last text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Last column written
    pub column: usize,
    pub row: usize,
    /// Characters in the run
    pub run_length: usize,
}

/// Colors used by the overlay, as 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub foreground: u32,
    pub background: u32,
    /// Alpha given to background pixels so the display shows through
    pub background_alpha: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            foreground: 0xFF_FF_FF,
            background: 0x00_00_00,
            background_alpha: 0xC0,
        }
    }
}

/// Color and alpha planes
#[derive(Debug)]
struct Plane {
    color: Vec<u32>,
    alpha: Vec<u8>,
}

/// Video memory words whose cache entries were drawn over
#[derive(Debug)]
struct WordMask {
    bits: Vec<u64>,
    any: bool,
}

impl WordMask {
    fn new() -> Self {
        Self {
            bits: vec![0; WORDS_PER_ROW * MEMORY_ROWS / 64],
            any: false,
        }
    }

    #[inline]
    fn set(&mut self, address: usize) {
        self.bits[address / 64] |= 1 << (address % 64);
        self.any = true;
    }

    fn clear(&mut self) {
        if self.any {
            self.bits.fill(0);
            self.any = false;
        }
    }
}

/// Text overlay frame buffer
#[derive(Debug)]
pub struct Overlay {
    plane: Option<Plane>,
    style: OverlayStyle,
    enabled: bool,

    /// Plane changed since the texture was built
    dirty: bool,
    /// Plane or enable state changed since the last composite
    composite_pending: bool,
    /// RGBA texture built from the planes, empty until first needed
    texture: Vec<u8>,

    anchor_column: usize,
    last_start: usize,
    last_row: usize,
    last_len: usize,

    invalid_words: WordMask,
    invalidate_all: bool,

    #[cfg(test)]
    fail_next_texture: bool,
}

impl Overlay {
    /// Create a closed overlay
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            plane: None,
            style,
            enabled: false,
            dirty: true,
            composite_pending: false,
            texture: Vec::new(),
            anchor_column: 0,
            last_start: 0,
            last_row: 0,
            last_len: 0,
            invalid_words: WordMask::new(),
            invalidate_all: false,
            #[cfg(test)]
            fail_next_texture: false,
        }
    }

    /// Allocate the planes; a no-op if already open
    pub fn open(&mut self) {
        if self.plane.is_some() {
            return;
        }

        let size = OVERLAY_WIDTH * OVERLAY_HEIGHT;
        self.plane = Some(Plane {
            color: vec![self.style.background; size],
            alpha: vec![0; size],
        });
        self.anchor_column = 0;
        self.last_start = 0;
        self.last_row = 0;
        self.last_len = 0;
        self.enabled = false;
        self.dirty = true;
        debug!("overlay opened ({}x{})", OVERLAY_WIDTH, OVERLAY_HEIGHT);
    }

    /// Release the planes and texture; a no-op if already closed
    pub fn close(&mut self) {
        if self.plane.take().is_some() {
            self.enabled = false;
            self.texture = Vec::new();
            debug!("overlay closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.plane.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            column: self
                .last_start
                .saturating_add(self.last_len.saturating_sub(1)),
            row: self.last_row,
            run_length: self.last_len,
        }
    }

    /// Draw one character into the cell at (`column`, `row`)
    ///
    /// Characters outside the font are drawn as space. Cells outside the
    /// grid are clipped.
    pub fn print_char(&mut self, column: usize, row: usize, mode: DrawMode, font: Font, ch: char) {
        let Some(plane) = self.plane.as_mut() else {
            return;
        };
        if column >= COLUMNS || row >= ROWS {
            return;
        }

        let glyph = font::glyph(font, ch);
        let OverlayStyle {
            foreground,
            background,
            background_alpha,
        } = self.style;

        let x0 = column * GLYPH_WIDTH;
        let y0 = row * GLYPH_HEIGHT;
        for gy in 0..GLYPH_HEIGHT {
            let sy = y0 + gy;
            for gx in 0..GLYPH_WIDTH {
                let sx = x0 + gx;
                let index = sy * OVERLAY_WIDTH + sx;

                let mut pixel = if font::glyph_bit(&glyph, gx, gy) {
                    foreground
                } else {
                    background
                };
                if mode == DrawMode::Invert && plane.color[index] == background {
                    pixel = if pixel == background {
                        foreground
                    } else {
                        background
                    };
                }

                plane.alpha[index] = if pixel == background {
                    background_alpha
                } else {
                    OPAQUE
                };
                plane.color[index] = pixel;

                self.invalid_words
                    .set(word_address(sy, sx / PIXELS_PER_WORD));
            }
        }

        self.dirty = true;
        self.composite_pending = true;
    }

    /// Draw a run of text, updating the cursor
    ///
    /// # Arguments
    ///
    /// * `column` - Where the run starts: an absolute column, the last
    ///   absolute column, or right after the previous run
    /// * `row` - An absolute row, the row below the previous run, or the
    ///   same row
    /// * `mode` - Replace the cells or invert them
    /// * `font` - Normal or bold face
    /// * `text` - Characters to draw; those outside the font draw as space
    ///
    /// Rows past the last grid row are clamped to it. Columns past the grid
    /// are clamped to its right edge, so the run is clipped away.
    ///
    /// # Example
    ///
    /// ```
    /// use pro_term::overlay::{Column, DrawMode, Font, Overlay, Row};
    ///
    /// let mut overlay = Overlay::default();
    /// overlay.open();
    /// overlay.print_text(Column::Absolute(4), Row::Absolute(2), DrawMode::Replace, Font::Normal, "Menu");
    /// overlay.print_text(Column::ContinueColumn, Row::NextRow, DrawMode::Invert, Font::Bold, "Resume");
    /// assert_eq!(overlay.cursor().row, 3);
    /// assert_eq!(overlay.cursor().column, 9);
    /// ```
    pub fn print_text(&mut self, column: Column, row: Row, mode: DrawMode, font: Font, text: &str) {
        if self.plane.is_none() {
            return;
        }

        let x = match column {
            Column::Absolute(n) => {
                self.anchor_column = n.min(COLUMNS);
                n
            }
            Column::ContinueColumn => self.anchor_column,
            Column::ContinueAfterLast => self.last_start.saturating_add(self.last_len),
        }
        .min(COLUMNS);
        let y = match row {
            Row::Absolute(n) => n,
            Row::NextRow => self.last_row.saturating_add(1),
            Row::SameRow => self.last_row,
        }
        .min(ROWS - 1);

        let mut len = 0;
        for (i, ch) in text.chars().enumerate() {
            self.print_char(x.saturating_add(i), y, mode, font, ch);
            len += 1;
        }

        self.last_start = x;
        self.last_row = y;
        self.last_len = len;
    }

    /// Reset every pixel to transparent background
    pub fn clear(&mut self) {
        if let Some(plane) = self.plane.as_mut() {
            plane.color.fill(self.style.background);
            plane.alpha.fill(0);
            self.dirty = true;
            self.composite_pending = true;
        }
    }

    /// Clear the overlay and start blending it over the display
    pub fn enable(&mut self) {
        self.clear();
        self.enabled = true;
        self.composite_pending = true;
    }

    /// Stop blending; the whole video cache must be rebuilt
    pub fn disable(&mut self) {
        self.enabled = false;
        self.invalidate_all = true;
        self.composite_pending = true;
    }

    /// Color and alpha of an overlay pixel
    pub fn pixel(&self, x: usize, y: usize) -> Option<(u32, u8)> {
        let plane = self.plane.as_ref()?;
        if x >= OVERLAY_WIDTH || y >= OVERLAY_HEIGHT {
            return None;
        }
        let index = y * OVERLAY_WIDTH + x;
        Some((plane.color[index], plane.alpha[index]))
    }

    /// Report drawn-over video memory words to the emulation core
    pub fn take_invalidations<C: VideoCache + ?Sized>(&mut self, cache: &mut C) {
        if self.invalidate_all {
            cache.invalidate_all();
            self.invalidate_all = false;
            self.invalid_words.clear();
            return;
        }
        if !self.invalid_words.any {
            return;
        }

        for (i, &bits) in self.invalid_words.bits.iter().enumerate() {
            let mut bits = bits;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                cache.invalidate(i * 64 + bit);
                bits &= bits - 1;
            }
        }
        self.invalid_words.clear();
    }

    /// Whether the composed frame must be rebuilt, clearing the flag
    pub fn take_composite_pending(&mut self) -> bool {
        std::mem::take(&mut self.composite_pending)
    }

    /// Blend the overlay over an RGB24 frame of `width` x `height` pixels
    ///
    /// Returns whether anything was blended.
    pub fn composite_onto(&mut self, frame: &mut [u8], width: usize, height: usize) -> bool {
        if !self.enabled || self.plane.is_none() {
            return false;
        }
        if !self.refresh_texture() {
            self.composite_pending = true;
            return false;
        }

        let rows = height.min(OVERLAY_HEIGHT);
        let columns = width.min(OVERLAY_WIDTH);
        for y in 0..rows {
            let src_row = &self.texture[y * OVERLAY_WIDTH * 4..(y + 1) * OVERLAY_WIDTH * 4];
            let dst_row = &mut frame[y * width * 3..(y + 1) * width * 3];
            for x in 0..columns {
                let src = &src_row[x * 4..x * 4 + 4];
                let alpha = src[3] as u16;
                if alpha == 0 {
                    continue;
                }
                let dst = &mut dst_row[x * 3..x * 3 + 3];
                for c in 0..3 {
                    let blended = (src[c] as u16 * alpha + dst[c] as u16 * (255 - alpha) + 127) / 255;
                    dst[c] = blended as u8;
                }
            }
        }
        true
    }

    /// Rebuild the RGBA texture if the planes changed
    ///
    /// Returns false if the texture could not be allocated; it is retried on
    /// the next call.
    fn refresh_texture(&mut self) -> bool {
        let Some(plane) = self.plane.as_ref() else {
            return false;
        };

        let size = OVERLAY_WIDTH * OVERLAY_HEIGHT * 4;
        if self.texture.len() != size {
            self.texture.clear();
            #[cfg(test)]
            if std::mem::take(&mut self.fail_next_texture) {
                warn!("overlay texture allocation failed, retrying later");
                return false;
            }
            if let Err(e) = self.texture.try_reserve_exact(size) {
                warn!("overlay texture allocation failed, retrying later: {}", e);
                return false;
            }
            self.texture.resize(size, 0);
            self.dirty = true;
        }

        if self.dirty {
            for ((rgba, &color), &alpha) in self
                .texture
                .chunks_exact_mut(4)
                .zip(plane.color.iter())
                .zip(plane.alpha.iter())
            {
                if alpha > 0 {
                    rgba[0] = (color >> 16) as u8;
                    rgba[1] = (color >> 8) as u8;
                    rgba[2] = color as u8;
                    rgba[3] = alpha;
                } else {
                    rgba.fill(0);
                }
            }
            self.dirty = false;
        }
        true
    }
}

#[cfg(test)]
impl Overlay {
    /// Make the next texture allocation fail
    pub(crate) fn fail_next_texture(&mut self) {
        self.fail_next_texture = true;
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingCache {
        words: Vec<usize>,
        all: usize,
    }

    impl VideoCache for RecordingCache {
        fn invalidate(&mut self, address: usize) {
            self.words.push(address);
        }

        fn invalidate_all(&mut self) {
            self.all += 1;
        }
    }

    fn open_overlay() -> Overlay {
        let mut overlay = Overlay::default();
        overlay.open();
        overlay
    }

    fn cell_pixels(overlay: &Overlay, column: usize, row: usize) -> Vec<(u32, u8)> {
        let mut pixels = Vec::new();
        for y in 0..GLYPH_HEIGHT {
            for x in 0..GLYPH_WIDTH {
                pixels.push(
                    overlay
                        .pixel(column * GLYPH_WIDTH + x, row * GLYPH_HEIGHT + y)
                        .unwrap(),
                );
            }
        }
        pixels
    }

    #[test]
    fn test_closed_overlay_ignores_drawing() {
        let mut overlay = Overlay::default();
        overlay.print_text(Column::Absolute(3), Row::Absolute(3), DrawMode::Replace, Font::Normal, "X");
        assert_eq!(overlay.cursor(), Cursor::default());
        assert!(overlay.pixel(0, 0).is_none());
    }

    #[test]
    fn test_replace_writes_glyph_and_alpha() {
        let mut overlay = open_overlay();
        overlay.print_char(1, 2, DrawMode::Replace, Font::Normal, 'H');

        let style = overlay.style();
        // Row 1 of 'H' is 0x318: pixels 2,3 and 7,8 set
        let y = 2 * GLYPH_HEIGHT + 1;
        let x = GLYPH_WIDTH;
        assert_eq!(overlay.pixel(x + 2, y), Some((style.foreground, OPAQUE)));
        assert_eq!(
            overlay.pixel(x + 4, y),
            Some((style.background, style.background_alpha))
        );
        // Neighbouring cell untouched
        assert_eq!(overlay.pixel(x - 1, y), Some((style.background, 0)));
    }

    #[test]
    fn test_invert_is_self_inverse() {
        let mut overlay = open_overlay();
        overlay.print_char(5, 5, DrawMode::Replace, Font::Normal, 'A');
        let before = cell_pixels(&overlay, 5, 5);

        overlay.print_char(5, 5, DrawMode::Invert, Font::Normal, 'W');
        assert_ne!(cell_pixels(&overlay, 5, 5), before);
        overlay.print_char(5, 5, DrawMode::Invert, Font::Normal, 'W');

        assert_eq!(cell_pixels(&overlay, 5, 5), before);
    }

    #[test]
    fn test_invert_space_highlights_cell() {
        let mut overlay = open_overlay();
        overlay.print_char(0, 0, DrawMode::Invert, Font::Normal, ' ');

        let style = overlay.style();
        assert!(cell_pixels(&overlay, 0, 0)
            .iter()
            .all(|&p| p == (style.foreground, OPAQUE)));
    }

    #[test]
    fn test_out_of_range_char_draws_space() {
        let mut overlay = open_overlay();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, '\u{1}');
        overlay.print_char(1, 0, DrawMode::Replace, Font::Normal, ' ');
        assert_eq!(cell_pixels(&overlay, 0, 0), cell_pixels(&overlay, 1, 0));
    }

    #[test]
    fn test_print_text_cursor() {
        let mut overlay = open_overlay();
        for row in 0..ROWS {
            let row = if row == 0 { Row::Absolute(0) } else { Row::NextRow };
            overlay.print_text(Column::Absolute(0), row, DrawMode::Replace, Font::Normal, &" ".repeat(COLUMNS));
        }

        overlay.print_text(Column::Absolute(0), Row::Absolute(0), DrawMode::Replace, Font::Normal, "HELLO");

        assert_eq!(
            overlay.cursor(),
            Cursor {
                column: 4,
                row: 0,
                run_length: 5
            }
        );
        let style = overlay.style();
        for column in 0..5 {
            assert!(cell_pixels(&overlay, column, 0)
                .iter()
                .any(|&(color, _)| color == style.foreground));
        }
        assert!(cell_pixels(&overlay, 5, 0)
            .iter()
            .all(|&(color, _)| color == style.background));
    }

    #[test]
    fn test_print_text_continuations() {
        let mut overlay = open_overlay();
        overlay.print_text(Column::Absolute(10), Row::Absolute(3), DrawMode::Replace, Font::Normal, "ab");
        overlay.print_text(Column::ContinueAfterLast, Row::SameRow, DrawMode::Replace, Font::Normal, "cde");
        assert_eq!(overlay.cursor(), Cursor { column: 14, row: 3, run_length: 3 });

        overlay.print_text(Column::ContinueColumn, Row::NextRow, DrawMode::Replace, Font::Normal, "f");
        assert_eq!(overlay.cursor(), Cursor { column: 10, row: 4, run_length: 1 });
    }

    #[test]
    fn test_row_is_clamped() {
        let mut overlay = open_overlay();
        overlay.print_text(Column::Absolute(0), Row::Absolute(99), DrawMode::Replace, Font::Normal, "x");
        assert_eq!(overlay.cursor().row, ROWS - 1);

        overlay.print_text(Column::Absolute(0), Row::NextRow, DrawMode::Replace, Font::Normal, "y");
        assert_eq!(overlay.cursor().row, ROWS - 1);
    }

    #[test]
    fn test_text_past_last_column_is_clipped() {
        let mut overlay = open_overlay();
        overlay.print_text(Column::Absolute(78), Row::Absolute(0), DrawMode::Replace, Font::Normal, "WXYZ");
        assert_eq!(overlay.cursor().run_length, 4);
        let style = overlay.style();
        assert!(cell_pixels(&overlay, COLUMNS - 1, 0)
            .iter()
            .any(|&(color, _)| color == style.foreground));
    }

    #[test]
    fn test_huge_column_is_clamped_not_overflowed() {
        let mut overlay = open_overlay();
        overlay.print_text(Column::Absolute(usize::MAX), Row::Absolute(0), DrawMode::Replace, Font::Normal, "ab");
        assert_eq!(overlay.cursor(), Cursor { column: COLUMNS + 1, row: 0, run_length: 2 });

        // Continuing after the clipped run stays clipped
        overlay.print_text(Column::ContinueAfterLast, Row::SameRow, DrawMode::Replace, Font::Normal, "c");
        assert_eq!(overlay.cursor().column, COLUMNS);
        overlay.print_text(Column::ContinueColumn, Row::NextRow, DrawMode::Replace, Font::Normal, "d");
        assert_eq!(overlay.cursor(), Cursor { column: COLUMNS, row: 1, run_length: 1 });

        // Nothing landed inside the grid
        for row in 0..2 {
            for column in 0..COLUMNS {
                assert!(cell_pixels(&overlay, column, row)
                    .iter()
                    .all(|&(_, alpha)| alpha == 0));
            }
        }
    }

    #[test]
    fn test_continue_past_last_column_is_clipped() {
        let mut overlay = open_overlay();
        overlay.print_text(Column::Absolute(COLUMNS - 1), Row::Absolute(5), DrawMode::Replace, Font::Normal, "a");
        overlay.print_text(Column::ContinueAfterLast, Row::SameRow, DrawMode::Replace, Font::Normal, "b");
        assert_eq!(overlay.cursor(), Cursor { column: COLUMNS, row: 5, run_length: 1 });
    }

    #[test]
    fn test_clear_resets_alpha() {
        let mut overlay = open_overlay();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, 'M');
        overlay.clear();
        assert!(cell_pixels(&overlay, 0, 0)
            .iter()
            .all(|&(_, alpha)| alpha == 0));
    }

    #[test]
    fn test_print_reports_cache_words() {
        let mut overlay = open_overlay();
        let mut cache = RecordingCache::default();
        // Cell 1 spans pixels 12..24: words 0 and 1 of rows 0..10
        overlay.print_char(1, 0, DrawMode::Replace, Font::Normal, 'i');
        overlay.take_invalidations(&mut cache);

        assert_eq!(cache.words.len(), 20);
        assert!(cache.words.contains(&word_address(0, 0)));
        assert!(cache.words.contains(&word_address(9, 1)));

        cache.words.clear();
        overlay.take_invalidations(&mut cache);
        assert!(cache.words.is_empty());
    }

    #[test]
    fn test_disable_invalidates_whole_cache() {
        let mut overlay = open_overlay();
        let mut cache = RecordingCache::default();
        overlay.enable();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, 'a');
        overlay.disable();
        overlay.take_invalidations(&mut cache);

        assert_eq!(cache.all, 1);
        assert!(cache.words.is_empty());
        assert!(!overlay.is_enabled());
    }

    #[test]
    fn test_composite_blends_only_visible_pixels() {
        let mut overlay = open_overlay();
        overlay.enable();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, 'H');
        let width = 1024;
        let height = 240;
        let mut frame = vec![100u8; width * height * 3];

        assert!(overlay.composite_onto(&mut frame, width, height));

        let at = |x: usize, y: usize| frame[(y * width + x) * 3];
        // Foreground pixel fully replaces the frame
        assert_eq!(at(2, 1), 255);
        // Background pixel darkens the frame
        assert_eq!(at(4, 1), 25);
        // Zero-alpha pixel leaves it as is
        assert_eq!(at(30, 30), 100);
        assert_eq!(at(1000, 0), 100);
    }

    #[test]
    fn test_failed_texture_is_retried() {
        let mut overlay = open_overlay();
        overlay.enable();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, 'H');
        assert!(overlay.take_composite_pending());
        let mut frame = vec![100u8; 1024 * 240 * 3];

        overlay.fail_next_texture();
        assert!(!overlay.composite_onto(&mut frame, 1024, 240));
        assert!(frame.iter().all(|&b| b == 100));
        assert!(overlay.take_composite_pending());

        assert!(overlay.composite_onto(&mut frame, 1024, 240));
        assert_eq!(frame[(1024 + 2) * 3], 255);
    }

    #[test]
    fn test_composite_disabled_is_noop() {
        let mut overlay = open_overlay();
        overlay.print_char(0, 0, DrawMode::Replace, Font::Normal, 'H');
        let mut frame = vec![7u8; 16 * 16 * 3];
        assert!(!overlay.composite_onto(&mut frame, 16, 16));
        assert!(frame.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_double_close_is_noop() {
        let mut overlay = open_overlay();
        overlay.close();
        overlay.close();
        assert!(!overlay.is_open());
    }
}
