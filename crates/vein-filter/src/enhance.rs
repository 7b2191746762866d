//! Tone reproduction curve (TRC) mapping
//!
//! Point operations on 8-bit values are expressed as 256-entry lookup
//! tables and applied with [`trc_map`].

use crate::{FilterError, FilterResult};
use vein_core::{Pix, PixMut, PixelDepth, color};

/// A 256-entry lookup table for tone reproduction curve mapping.
///
/// Maps input pixel values [0..255] to output pixel values [0..255].
pub type TrcLut = [u8; 256];

/// Generate a power-law gamma TRC.
///
/// `output = clip(round(255 * (input / 255) ^ gamma), 0, 255)`, evaluated
/// in `f32`. Values of `gamma` above 1.0 darken shadows; below 1.0 they
/// lighten them.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameters`] if `gamma <= 0` or is not
/// finite.
pub fn gamma_trc(gamma: f32) -> FilterResult<TrcLut> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(FilterError::InvalidParameters(format!(
            "gamma must be > 0.0, got {}",
            gamma
        )));
    }

    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let x = i as f32 / 255.0;
        let mapped = x.powf(gamma) * 255.0;
        *entry = mapped.round().clamp(0.0, 255.0) as u8;
    }
    Ok(lut)
}

/// Generate a linear stretch TRC with absolute value and saturation.
///
/// `output = saturate(round_half_even(|input * alpha + beta|))`,
/// evaluated in `f32`.
pub fn linear_trc(alpha: f32, beta: f32) -> TrcLut {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = (i as f32 * alpha + beta).abs();
        *entry = color::saturate_u8(v);
    }
    lut
}

/// Apply a TRC lookup table to an 8 bpp or 32 bpp image in-place.
///
/// For 32 bpp images the table is applied to each of R, G, B.
pub fn trc_map(pix: &mut PixMut, lut: &TrcLut) -> FilterResult<()> {
    let d = pix.depth();
    let w = pix.width();
    let h = pix.height();

    match d {
        PixelDepth::Bit8 => {
            for y in 0..h {
                for x in 0..w {
                    let val = pix.get_pixel_unchecked(x, y) as usize;
                    pix.set_pixel_unchecked(x, y, lut[val] as u32);
                }
            }
        }
        PixelDepth::Bit32 => {
            for y in 0..h {
                for x in 0..w {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    let pixel =
                        color::compose_rgb(lut[r as usize], lut[g as usize], lut[b as usize]);
                    pix.set_pixel_unchecked(x, y, pixel);
                }
            }
        }
        PixelDepth::Bit1 => {
            return Err(FilterError::UnsupportedDepth {
                expected: "8 or 32 bpp",
                actual: d.bits(),
            });
        }
    }

    Ok(())
}

fn map_copy(pix: &Pix, lut: &TrcLut) -> FilterResult<Pix> {
    let mut pm = pix.to_mut();
    trc_map(&mut pm, lut)?;
    Ok(pm.into())
}

/// Apply a gamma TRC to an image.
///
/// Returns a new image; the input is unchanged.
pub fn gamma_trc_pix(pix: &Pix, gamma: f32) -> FilterResult<Pix> {
    let lut = gamma_trc(gamma)?;
    map_copy(pix, &lut)
}

/// Apply a linear stretch TRC to an image.
///
/// Returns a new image; the input is unchanged.
pub fn linear_trc_pix(pix: &Pix, alpha: f32, beta: f32) -> FilterResult<Pix> {
    let lut = linear_trc(alpha, beta);
    map_copy(pix, &lut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_trc_endpoints_and_monotone() {
        let lut = gamma_trc(2.2).unwrap();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert_eq!(lut[30], 2);
        assert_eq!(lut[200], 149);
        // 255 * (128/255)^2.2 = 55.98 rounds up
        assert_eq!(lut[128], 56);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert!(gamma_trc(0.0).is_err());
        assert!(gamma_trc(f32::NAN).is_err());
    }

    #[test]
    fn test_linear_trc_saturates_and_rounds_even() {
        let lut = linear_trc(1.9, 0.0);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[2], 4);
        assert_eq!(lut[100], 190);
        assert_eq!(lut[135], 255);
        assert_eq!(lut[255], 255);

        let half = linear_trc(0.5, 0.0);
        assert_eq!(half[1], 0);
        assert_eq!(half[3], 2);
        assert_eq!(half[5], 2);
    }

    #[test]
    fn test_trc_map_rgb_and_binary() {
        let mut pm = Pix::new(1, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_rgb(0, 0, 10, 20, 30).unwrap();
        let lut = linear_trc(2.0, 0.0);
        trc_map(&mut pm, &lut).unwrap();
        let pix: Pix = pm.into();
        assert_eq!(pix.get_rgb(0, 0), Some((20, 40, 60)));

        let mut bin = Pix::new(1, 1, PixelDepth::Bit1).unwrap().to_mut();
        assert!(trc_map(&mut bin, &lut).is_err());
    }
}
