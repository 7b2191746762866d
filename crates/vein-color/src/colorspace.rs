//! Color space operations
//!
//! Highlight suppression works on the lightness channel of the HLS
//! representation (see [`vein_core::color::rgb_to_hls`]). The result is
//! collapsed back to gray with the fixed-point luma weights.

use crate::{ColorError, ColorResult};
use vein_core::{Pix, PixelDepth, color};

/// Reduce lightness in proportion to itself.
///
/// `L' = trunc(clip(L - (L / 255) * strength, 0, 255))`
#[inline]
fn damp_lightness(l: u8, strength: f32) -> u8 {
    let lf = l as f32;
    (lf - lf / 255.0 * strength).clamp(0.0, 255.0) as u8
}

/// Convert an image to 8 bpp gray.
///
/// 32 bpp uses the fixed-point luma weights, 1 bpp maps foreground to 255
/// and 8 bpp is returned as a shared clone.
pub fn pix_convert_to_gray(pix: &Pix) -> ColorResult<Pix> {
    Ok(pix.convert_to_8()?)
}

/// Suppress bright regions by darkening the HLS lightness channel.
///
/// # Arguments
///
/// * `pix` - 8 bpp gray (replicated into RGB first) or 32 bpp RGB
/// * `strength` - Lightness reduction at `L = 255`; the reduction scales
///   linearly with `L`
///
/// Returns an 8 bpp image. Hue and saturation round-trip through the
/// 8-bit HLS convention, so gray inputs stay gray.
///
/// # Errors
///
/// Returns an error for 1 bpp input or a negative or non-finite
/// `strength`.
pub fn suppress_highlights(pix: &Pix, strength: f32) -> ColorResult<Pix> {
    if !strength.is_finite() || strength < 0.0 {
        return Err(ColorError::InvalidParameters(format!(
            "highlight strength must be >= 0, got {}",
            strength
        )));
    }
    let rgb = match pix.depth() {
        PixelDepth::Bit32 => pix.clone(),
        PixelDepth::Bit8 => pix.convert_8_to_32()?,
        PixelDepth::Bit1 => {
            return Err(ColorError::UnsupportedDepth {
                expected: "8 or 32 bpp",
                actual: 1,
            });
        }
    };

    let (w, h) = rgb.dimensions();
    let mut out = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();
    out.set_informat(pix.informat());

    for y in 0..h {
        for x in 0..w {
            let (r, g, b) = color::extract_rgb(rgb.get_pixel_unchecked(x, y));
            let mut hls = color::rgb_to_hls(r, g, b);
            hls.l = damp_lightness(hls.l, strength);
            let (r, g, b) = color::hls_to_rgb(hls);
            out.set_pixel_unchecked(x, y, color::luma(r, g, b) as u32);
        }
    }

    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damp_lightness() {
        assert_eq!(damp_lightness(0, 50.0), 0);
        assert_eq!(damp_lightness(255, 50.0), 205);
        // 4 - 4/255*50 = 3.22
        assert_eq!(damp_lightness(4, 50.0), 3);
        assert_eq!(damp_lightness(100, 0.0), 100);
    }

    #[test]
    fn test_gray_input() {
        let pix = Pix::from_gray_bytes(4, 1, &[0, 4, 149, 255]).unwrap();
        let out = suppress_highlights(&pix, 50.0).unwrap();
        assert_eq!(out.depth(), PixelDepth::Bit8);
        let vals: Vec<u32> = (0..4).map(|x| out.get_pixel(x, 0).unwrap()).collect();
        // 149 - 149/255*50 = 119.78
        assert_eq!(vals, vec![0, 3, 119, 205]);
    }

    #[test]
    fn test_rgb_input_darkens() {
        let mut pm = Pix::new(1, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_rgb(0, 0, 240, 200, 180).unwrap();
        let pix: Pix = pm.into();
        let before = pix.convert_to_8().unwrap().get_pixel(0, 0).unwrap();
        let after = suppress_highlights(&pix, 50.0).unwrap().get_pixel(0, 0).unwrap();
        assert!(after < before);
    }

    #[test]
    fn test_rejects_binary_and_bad_strength() {
        let bin = Pix::new(3, 3, PixelDepth::Bit1).unwrap();
        assert!(suppress_highlights(&bin, 50.0).is_err());
        let gray = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        assert!(suppress_highlights(&gray, -1.0).is_err());
        assert!(suppress_highlights(&gray, f32::NAN).is_err());
    }
}
