//! Morphological application functions
//!
//! Pair masking: pixels that are pure black in a reference image mark
//! regions with no usable signal. The mask is grown with a square
//! dilation and the same regions are blacked out in a target image, so
//! both images of a pair carry identical dead areas.

use crate::{MorphError, MorphResult, dilate_brick};
use vein_core::{Pix, PixelDepth, color};

/// Side of the square dilation applied to the black mask in [`mask_pair`].
pub const PAIR_MASK_DILATION: u32 = 5;

/// Build a 1 bpp mask of the pure-black pixels of an image.
///
/// 8 bpp pixels count as black at value 0, 32 bpp pixels at RGB
/// (0, 0, 0) regardless of alpha, and 1 bpp pixels when clear.
pub fn black_mask(pix: &Pix) -> MorphResult<Pix> {
    let (w, h) = pix.dimensions();
    let mut mask = Pix::new(w, h, PixelDepth::Bit1)?.try_into_mut().unwrap();
    for y in 0..h {
        for x in 0..w {
            let v = pix.get_pixel_unchecked(x, y);
            let black = match pix.depth() {
                PixelDepth::Bit1 | PixelDepth::Bit8 => v == 0,
                PixelDepth::Bit32 => color::extract_rgb(v) == (0, 0, 0),
            };
            if black {
                mask.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    Ok(mask.into())
}

/// Set every pixel of `target` under the set pixels of `mask` to black.
///
/// # Errors
///
/// Returns an error if `mask` is not 1 bpp or the sizes differ.
pub fn apply_black_mask(target: &Pix, mask: &Pix) -> MorphResult<Pix> {
    if mask.depth() != PixelDepth::Bit1 {
        return Err(MorphError::UnsupportedDepth {
            expected: "1 bpp mask",
            actual: mask.depth().bits(),
        });
    }
    target.check_same_size(mask)?;

    let black = match target.depth() {
        PixelDepth::Bit32 => color::compose_rgb(0, 0, 0),
        _ => 0,
    };
    let mut out = target.to_mut();
    for y in 0..target.height() {
        for x in 0..target.width() {
            if mask.get_pixel_unchecked(x, y) != 0 {
                out.set_pixel_unchecked(x, y, black);
            }
        }
    }
    Ok(out.into())
}

/// Black out the target wherever the reference is black.
///
/// The black pixels of `reference` are dilated with a
/// [`PAIR_MASK_DILATION`] square and applied to `target`. Images of
/// different sizes are both cropped to their common top-left region
/// first; the result has that size.
pub fn mask_pair(reference: &Pix, target: &Pix) -> MorphResult<Pix> {
    let (reference, target) = reference.crop_to_match(target)?;
    let mask = black_mask(&reference)?;
    let mask = dilate_brick(&mask, PAIR_MASK_DILATION, PAIR_MASK_DILATION)?;
    apply_black_mask(&target, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit8).unwrap().to_mut();
        for y in 0..h {
            for x in 0..w {
                pm.set_pixel_unchecked(x, y, f(x, y) as u32);
            }
        }
        pm.into()
    }

    #[test]
    fn test_black_mask_depths() {
        let g = gray(3, 1, |x, _| x as u8);
        assert_eq!(black_mask(&g).unwrap().count_pixels().unwrap(), 1);

        let mut pm = Pix::new(2, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_pixel(0, 0, 0x0000_0000).unwrap();
        pm.set_rgb(1, 0, 0, 0, 1).unwrap();
        let rgb: Pix = pm.into();
        let mask = black_mask(&rgb).unwrap();
        assert_eq!(mask.get_pixel(0, 0), Some(1));
        assert_eq!(mask.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn test_mask_pair_dilates() {
        let reference = gray(20, 20, |x, y| if (x, y) == (10, 10) { 0 } else { 100 });
        let target = gray(20, 20, |_, _| 200);
        let out = mask_pair(&reference, &target).unwrap();
        assert_eq!(out.get_pixel(8, 8), Some(0));
        assert_eq!(out.get_pixel(12, 12), Some(0));
        assert_eq!(out.get_pixel(13, 10), Some(200));
        let zeros = (0..20)
            .flat_map(|y| (0..20).map(move |x| (x, y)))
            .filter(|&(x, y)| out.get_pixel(x, y) == Some(0))
            .count();
        assert_eq!(zeros, 25);
    }

    #[test]
    fn test_mask_pair_crops_to_common_size() {
        let reference = gray(10, 8, |_, _| 0);
        let target = gray(6, 12, |_, _| 50);
        let out = mask_pair(&reference, &target).unwrap();
        assert_eq!(out.dimensions(), (6, 8));
        assert!(out.data().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_apply_black_mask_rgb() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_rgb(0, 0, 9, 9, 9).unwrap();
        pm.set_rgb(1, 0, 9, 9, 9).unwrap();
        let rgb: Pix = pm.into();
        let mut mm = Pix::new(2, 1, PixelDepth::Bit1).unwrap().to_mut();
        mm.set_pixel(1, 0, 1).unwrap();
        let out = apply_black_mask(&rgb, &mm.into()).unwrap();
        assert_eq!(out.get_rgb(0, 0), Some((9, 9, 9)));
        assert_eq!(out.get_rgb(1, 0), Some((0, 0, 0)));
    }
}
