//! vein-core - Basic data structures for vein image processing
//!
//! This crate provides the fundamental data structures used throughout
//! the vein binarization pipeline:
//!
//! - [`Pix`] / [`PixMut`] - The main image container (immutable / mutable)
//! - [`FPix`] - Floating-point image for intermediate results
//! - [`color`] - RGB packing, HLS conversion and luma helpers

pub mod error;
pub mod fpix;
pub mod pix;

pub use error::{Error, Result};
pub use fpix::{FPix, Rounding};
pub use pix::{ImageFormat, Pix, PixMut, PixelDepth};

/// Color channel helpers for 32-bit RGB pixels.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBBAA` (red in MSB, alpha in LSB).
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;
    pub const ALPHA_SHIFT: u32 = 0;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Compose a 32-bit RGB pixel (alpha = 255).
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | (255 << ALPHA_SHIFT)
    }

    /// Extract RGB values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Round half to even and saturate to the 8-bit range.
    ///
    /// NaN maps to 0.
    #[inline]
    pub fn saturate_u8(value: f32) -> u8 {
        value.round_ties_even().clamp(0.0, 255.0) as u8
    }

    /// ITU-R 601 luma with 14-bit fixed-point weights.
    ///
    /// The weights sum to `1 << 14`, so a pixel with equal channels maps
    /// to exactly that channel value.
    #[inline]
    pub fn luma(r: u8, g: u8, b: u8) -> u8 {
        const R_WT: u32 = 4899;
        const G_WT: u32 = 9617;
        const B_WT: u32 = 1868;
        ((r as u32 * R_WT + g as u32 * G_WT + b as u32 * B_WT + (1 << 13)) >> 14) as u8
    }

    /// HLS color values in the 8-bit convention.
    ///
    /// Ranges: h [0..180] (degrees halved), l [0..255], s [0..255].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Hls {
        pub h: u8,
        pub l: u8,
        pub s: u8,
    }

    /// Convert RGB to HLS.
    ///
    /// Lightness is the midpoint of the largest and smallest channel.
    /// Achromatic pixels (all channels equal) get `h = s = 0`.
    pub fn rgb_to_hls(r: u8, g: u8, b: u8) -> Hls {
        let rf = r as f32 / 255.0;
        let gf = g as f32 / 255.0;
        let bf = b as f32 / 255.0;

        let vmax = rf.max(gf).max(bf);
        let vmin = rf.min(gf).min(bf);
        let diff = vmax - vmin;
        let l = (vmax + vmin) * 0.5;

        let (h, s) = if diff > f32::EPSILON {
            let s = if l < 0.5 {
                diff / (vmax + vmin)
            } else {
                diff / (2.0 - vmax - vmin)
            };
            let scale = 60.0 / diff;
            let mut h = if vmax == rf {
                (gf - bf) * scale
            } else if vmax == gf {
                (bf - rf) * scale + 120.0
            } else {
                (rf - gf) * scale + 240.0
            };
            if h < 0.0 {
                h += 360.0;
            }
            (h, s)
        } else {
            (0.0, 0.0)
        };

        Hls {
            h: saturate_u8(h * 0.5),
            l: saturate_u8(l * 255.0),
            s: saturate_u8(s * 255.0),
        }
    }

    /// Convert HLS back to RGB.
    pub fn hls_to_rgb(hls: Hls) -> (u8, u8, u8) {
        let l = hls.l as f32 / 255.0;
        let s = hls.s as f32 / 255.0;

        if hls.s == 0 {
            let v = saturate_u8(l * 255.0);
            return (v, v, v);
        }

        // (b, g, r) indices into the ramp table, per 60-degree sector
        const SECTORS: [[usize; 3]; 6] = [
            [1, 3, 0],
            [1, 0, 2],
            [3, 0, 1],
            [0, 2, 1],
            [0, 1, 3],
            [2, 1, 0],
        ];

        let p2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p1 = 2.0 * l - p2;

        let mut h = hls.h as f32 * 2.0 / 60.0;
        while h >= 6.0 {
            h -= 6.0;
        }
        let sector = (h.floor() as usize).min(5);
        let frac = h - sector as f32;

        let tab = [
            p2,
            p1,
            p1 + (p2 - p1) * (1.0 - frac),
            p1 + (p2 - p1) * frac,
        ];
        let idx = SECTORS[sector];

        (
            saturate_u8(tab[idx[2]] * 255.0),
            saturate_u8(tab[idx[1]] * 255.0),
            saturate_u8(tab[idx[0]] * 255.0),
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_luma_of_gray_is_identity() {
            for v in 0..=255u8 {
                assert_eq!(luma(v, v, v), v);
            }
        }

        #[test]
        fn test_hls_gray_roundtrip() {
            for v in [0u8, 1, 17, 128, 204, 255] {
                let hls = rgb_to_hls(v, v, v);
                assert_eq!(hls.s, 0);
                assert_eq!(hls.l, v);
                assert_eq!(hls_to_rgb(hls), (v, v, v));
            }
        }

        #[test]
        fn test_hls_primaries() {
            let red = rgb_to_hls(255, 0, 0);
            assert_eq!(red, Hls { h: 0, l: 128, s: 255 });

            let green = rgb_to_hls(0, 255, 0);
            assert_eq!(green.h, 60);

            let blue = rgb_to_hls(0, 0, 255);
            assert_eq!(blue.h, 120);

            let (r, g, b) = hls_to_rgb(Hls { h: 0, l: 128, s: 255 });
            assert_eq!((r, g, b), (255, 1, 1));
        }

        #[test]
        fn test_saturate_u8() {
            assert_eq!(saturate_u8(-3.0), 0);
            assert_eq!(saturate_u8(300.0), 255);
            assert_eq!(saturate_u8(2.5), 2);
            assert_eq!(saturate_u8(3.5), 4);
            assert_eq!(saturate_u8(f32::NAN), 0);
        }
    }
}
