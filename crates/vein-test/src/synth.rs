//! Synthetic test images
//!
//! Small deterministic images with known structure: uniform fields,
//! horizontal vein-like stripes and square blobs.

use vein_core::{Pix, PixelDepth};

/// Uniform 8 bpp image.
pub fn uniform(width: u32, height: u32, value: u8) -> Pix {
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)
        .unwrap()
        .try_into_mut()
        .unwrap();
    for y in 0..height {
        for x in 0..width {
            pm.set_pixel_unchecked(x, y, value as u32);
        }
    }
    pm.into()
}

/// 8 bpp image with value `bg` everywhere except rows `rows` which are `fg`.
pub fn horizontal_stripe(
    width: u32,
    height: u32,
    bg: u8,
    fg: u8,
    rows: std::ops::RangeInclusive<u32>,
) -> Pix {
    let mut pm = uniform(width, height, bg).to_mut();
    for y in rows.filter(|&y| y < height) {
        for x in 0..width {
            pm.set_pixel_unchecked(x, y, fg as u32);
        }
    }
    pm.into()
}

/// 8 bpp horizontal ramp: column `x` has value `x * 255 / (width - 1)`.
pub fn horizontal_ramp(width: u32, height: u32) -> Pix {
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)
        .unwrap()
        .try_into_mut()
        .unwrap();
    let denom = width.max(2) - 1;
    for y in 0..height {
        for x in 0..width {
            pm.set_pixel_unchecked(x, y, x * 255 / denom);
        }
    }
    pm.into()
}

/// 1 bpp image with filled squares `(x, y, side)` set to foreground.
pub fn binary_squares(width: u32, height: u32, squares: &[(u32, u32, u32)]) -> Pix {
    let mut pm = Pix::new(width, height, PixelDepth::Bit1)
        .unwrap()
        .try_into_mut()
        .unwrap();
    for &(sx, sy, side) in squares {
        for y in sy..(sy + side).min(height) {
            for x in sx..(sx + side).min(width) {
                pm.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    pm.into()
}

/// Deterministic pseudo-random 8 bpp texture (xorshift), values in `[lo, hi]`.
pub fn noise(width: u32, height: u32, lo: u8, hi: u8, seed: u32) -> Pix {
    let mut state = seed.max(1);
    let span = (hi.saturating_sub(lo) as u32) + 1;
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)
        .unwrap()
        .try_into_mut()
        .unwrap();
    for y in 0..height {
        for x in 0..width {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            pm.set_pixel_unchecked(x, y, lo as u32 + state % span);
        }
    }
    pm.into()
}

/// Collect the 8 bpp values of a row.
pub fn row_values(pix: &Pix, y: u32) -> Vec<u32> {
    (0..pix.width()).map(|x| pix.get_pixel_unchecked(x, y)).collect()
}
