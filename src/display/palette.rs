// Palette - The eight logical colors of the bitmap video option
//
// Three bit-planes give a 3-bit color index per pixel. Each index maps to a
// fixed RGB color, stored here in packed RGB332 form (3 bits red, 3 bits
// green, 2 bits blue) so the index buffer stays one byte per pixel.

/// Number of logical colors addressable by three bit-planes
pub const NUM_COLORS: usize = 8;

/// Logical palette in 24-bit RGB
///
/// Index bit 0 selects red, bit 1 green and bit 2 blue.
pub const PALETTE: [[u8; 3]; NUM_COLORS] = [
    [0, 0, 0],       // black
    [255, 0, 0],     // red
    [0, 255, 0],     // green
    [255, 255, 0],   // yellow
    [0, 0, 255],     // blue
    [255, 0, 255],   // magenta
    [0, 255, 255],   // cyan
    [255, 255, 255], // white
];

/// Packed RGB332 value for every logical color index
pub const RGB332_MAP: [u8; NUM_COLORS] = build_rgb332_map();

const fn build_rgb332_map() -> [u8; NUM_COLORS] {
    let mut map = [0u8; NUM_COLORS];
    let mut i = 0;
    while i < NUM_COLORS {
        let [r, g, b] = PALETTE[i];
        map[i] = pack_rgb332(r, g, b);
        i += 1;
    }
    map
}

/// Pack a 24-bit color into RGB332
#[inline]
pub const fn pack_rgb332(r: u8, g: u8, b: u8) -> u8 {
    ((r >> 5) << 5) | ((g >> 5) << 2) | (b >> 6)
}

/// Expand an RGB332 value to 24-bit color
///
/// Each channel is rescaled proportionally so that the largest channel value
/// maps to 255.
#[inline]
pub const fn expand_rgb332(packed: u8) -> [u8; 3] {
    let r = ((packed >> 5) & 0x07) as u16;
    let g = ((packed >> 2) & 0x07) as u16;
    let b = (packed & 0x03) as u16;
    [
        (r * 255 / 7) as u8,
        (g * 255 / 7) as u8,
        (b * 255 / 3) as u8,
    ]
}

/// Look up the packed color of a logical color index
///
/// Only the low three bits of `index` are used.
#[inline]
pub fn index_to_rgb332(index: u8) -> u8 {
    RGB332_MAP[(index & 0x07) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb332_map_primaries() {
        assert_eq!(RGB332_MAP[0], 0x00);
        assert_eq!(RGB332_MAP[1], 0xE0); // red
        assert_eq!(RGB332_MAP[2], 0x1C); // green
        assert_eq!(RGB332_MAP[4], 0x03); // blue
        assert_eq!(RGB332_MAP[7], 0xFF);
    }

    #[test]
    fn test_palette_survives_packing() {
        // All palette channels are 0 or 255, so packing is lossless
        for (i, rgb) in PALETTE.iter().enumerate() {
            assert_eq!(expand_rgb332(RGB332_MAP[i]), *rgb, "color {}", i);
        }
    }

    #[test]
    fn test_expand_intermediate_levels() {
        // r=3, g=5, b=1
        let packed = (3 << 5) | (5 << 2) | 1;
        assert_eq!(expand_rgb332(packed), [109, 182, 85]);
    }

    #[test]
    fn test_index_masking() {
        assert_eq!(index_to_rgb332(0x0D), RGB332_MAP[5]);
    }
}
