//! Correlation with explicit border handling, the Gabor orientation bank
//! and pixelwise fusion of grayscale responses.
//!
//! Kernels are applied as correlation: the output at `(x, y)` is the sum of
//! `k(kx, ky) * src(x + kx - cx, y + ky - cy)`. Symmetric kernels give the
//! same result as convolution.

use crate::{FilterError, FilterResult, Kernel, check_grayscale};
use rayon::prelude::*;
use vein_core::{Pix, PixelDepth, color};

/// How pixels outside the image are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderPolicy {
    /// Repeat the nearest edge pixel (`aaa|abcd|ddd`)
    #[default]
    Replicate,
    /// Mirror without repeating the edge pixel (`dcb|abcd|cba`)
    Reflect101,
    /// Treat outside pixels as 0
    Zero,
}

impl BorderPolicy {
    /// Map a possibly out-of-range coordinate to an image coordinate.
    ///
    /// Returns `None` when the pixel should read as zero.
    #[inline]
    pub fn resolve(self, i: i32, n: u32) -> Option<u32> {
        let n = n as i32;
        if (0..n).contains(&i) {
            return Some(i as u32);
        }
        match self {
            BorderPolicy::Replicate => Some(i.clamp(0, n - 1) as u32),
            BorderPolicy::Zero => None,
            BorderPolicy::Reflect101 => {
                if n == 1 {
                    return Some(0);
                }
                let period = 2 * (n - 1);
                let mut j = i.rem_euclid(period);
                if j >= n {
                    j = period - j;
                }
                Some(j as u32)
            }
        }
    }
}

/// Correlate an 8-bit grayscale image with a kernel.
///
/// Sums are accumulated in `f32`; each result is rounded half to even and
/// saturated to `[0, 255]`. The output has the input's dimensions.
pub fn convolve_gray(pix: &Pix, kernel: &Kernel, border: BorderPolicy) -> FilterResult<Pix> {
    check_grayscale(pix)?;

    let w = pix.width();
    let h = pix.height();
    let kw = kernel.width();
    let kh = kernel.height();
    let kcx = kernel.center_x() as i32;
    let kcy = kernel.center_y() as i32;

    // Precompute the source coordinate for every (output, kernel) offset
    let xmap: Vec<Option<u32>> = (0..w as i32)
        .flat_map(|x| (0..kw as i32).map(move |kx| border.resolve(x + kx - kcx, w)))
        .collect();
    let ymap: Vec<Option<u32>> = (0..h as i32)
        .flat_map(|y| (0..kh as i32).map(move |ky| border.resolve(y + ky - kcy, h)))
        .collect();

    let out_pix = Pix::new(w, h, PixelDepth::Bit8)?;
    let mut out_mut = out_pix.try_into_mut().unwrap();

    for y in 0..h {
        let rows = &ymap[(y * kh) as usize..((y + 1) * kh) as usize];
        for x in 0..w {
            let cols = &xmap[(x * kw) as usize..((x + 1) * kw) as usize];
            let mut sum = 0.0f32;

            for (ky, sy) in rows.iter().enumerate() {
                let Some(sy) = *sy else { continue };
                let krow = &kernel.data()[ky * kw as usize..(ky + 1) * kw as usize];
                for (k, sx) in krow.iter().zip(cols) {
                    if let Some(sx) = *sx {
                        sum += pix.get_pixel_unchecked(sx, sy) as f32 * k;
                    }
                }
            }

            out_mut.set_pixel_unchecked(x, y, color::saturate_u8(sum) as u32);
        }
    }

    Ok(out_mut.into())
}

/// Per-pixel maximum of a set of same-size 8 bpp images.
///
/// # Errors
///
/// Returns an error for an empty set, a non-8 bpp member or a size
/// mismatch.
pub fn max_fuse(images: &[Pix]) -> FilterResult<Pix> {
    let Some((first, rest)) = images.split_first() else {
        return Err(FilterError::InvalidParameters(
            "max_fuse needs at least one image".to_string(),
        ));
    };
    check_grayscale(first)?;
    for pix in rest {
        check_grayscale(pix)?;
        first.check_same_size(pix)?;
    }

    let mut out = first.to_mut();
    for pix in rest {
        for (dst, src) in out.data_mut().iter_mut().zip(pix.data()) {
            *dst = max_bytes(*dst, *src);
        }
    }
    Ok(out.into())
}

/// Bytewise maximum of two packed 8 bpp words.
#[inline]
fn max_bytes(a: u32, b: u32) -> u32 {
    let mut out = 0;
    for shift in [24, 16, 8, 0] {
        let va = (a >> shift) & 0xff;
        let vb = (b >> shift) & 0xff;
        out |= va.max(vb) << shift;
    }
    out
}

/// Weighted sum of two 8 bpp images.
///
/// `out = saturate(round_half_even(wa * a + wb * b))`, computed in `f32`.
pub fn blend_gray(a: &Pix, wa: f32, b: &Pix, wb: f32) -> FilterResult<Pix> {
    check_grayscale(a)?;
    check_grayscale(b)?;
    a.check_same_size(b)?;

    let (w, h) = a.dimensions();
    let mut out = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();
    for y in 0..h {
        for x in 0..w {
            let va = a.get_pixel_unchecked(x, y) as f32;
            let vb = b.get_pixel_unchecked(x, y) as f32;
            out.set_pixel_unchecked(x, y, color::saturate_u8(wa * va + wb * vb) as u32);
        }
    }
    Ok(out.into())
}

/// Correlate an image with every kernel of a bank and fuse by maximum.
///
/// Kernels are applied in parallel; the per-pixel maximum is folded in
/// bank order, so the result does not depend on scheduling.
pub fn gabor_bank_response(
    pix: &Pix,
    kernels: &[Kernel],
    border: BorderPolicy,
) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    if kernels.is_empty() {
        return Err(FilterError::InvalidParameters(
            "kernel bank is empty".to_string(),
        ));
    }
    let responses = kernels
        .par_iter()
        .map(|k| convolve_gray(pix, k, border))
        .collect::<FilterResult<Vec<_>>>()?;
    max_fuse(&responses)
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
    fn test_border_resolve() {
        assert_eq!(BorderPolicy::Replicate.resolve(-2, 5), Some(0));
        assert_eq!(BorderPolicy::Replicate.resolve(7, 5), Some(4));
        assert_eq!(BorderPolicy::Reflect101.resolve(-1, 5), Some(1));
        assert_eq!(BorderPolicy::Reflect101.resolve(-2, 5), Some(2));
        assert_eq!(BorderPolicy::Reflect101.resolve(5, 5), Some(3));
        assert_eq!(BorderPolicy::Reflect101.resolve(-3, 1), Some(0));
        assert_eq!(BorderPolicy::Zero.resolve(-1, 5), None);
        assert_eq!(BorderPolicy::Zero.resolve(4, 5), Some(4));
    }

    #[test]
    fn test_identity_kernel() {
        let pix = gray(9, 7, |x, y| (x * 20 + y) as u8);
        let k = Kernel::from_slice(3, 3, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let out = convolve_gray(&pix, &k, BorderPolicy::Zero).unwrap();
        assert_eq!(out.data(), pix.data());
    }

    #[test]
    fn test_correlation_is_not_flipped() {
        // Kernel picks the right-hand neighbor
        let pix = gray(4, 1, |x, _| (x * 10) as u8);
        let k = Kernel::from_slice(3, 1, &[0.0, 0.0, 1.0]).unwrap();
        let out = convolve_gray(&pix, &k, BorderPolicy::Replicate).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(10));
        assert_eq!(out.get_pixel(3, 0), Some(30));

        let out = convolve_gray(&pix, &k, BorderPolicy::Reflect101).unwrap();
        assert_eq!(out.get_pixel(3, 0), Some(20));

        let out = convolve_gray(&pix, &k, BorderPolicy::Zero).unwrap();
        assert_eq!(out.get_pixel(3, 0), Some(0));
    }

    #[test]
    fn test_rounding_and_saturation() {
        let pix = gray(3, 1, |_, _| 5);
        let k = Kernel::from_slice(1, 1, &[0.5]).unwrap();
        // 2.5 rounds to even
        let out = convolve_gray(&pix, &k, BorderPolicy::Replicate).unwrap();
        assert_eq!(out.get_pixel(1, 0), Some(2));

        let k = Kernel::from_slice(1, 1, &[-1.0]).unwrap();
        let out = convolve_gray(&pix, &k, BorderPolicy::Replicate).unwrap();
        assert_eq!(out.get_pixel(1, 0), Some(0));

        let k = Kernel::from_slice(1, 1, &[100.0]).unwrap();
        let out = convolve_gray(&pix, &k, BorderPolicy::Replicate).unwrap();
        assert_eq!(out.get_pixel(1, 0), Some(255));
    }

    #[test]
    fn test_max_fuse_and_blend() {
        let a = gray(5, 2, |x, _| (x * 50) as u8);
        let b = gray(5, 2, |x, _| (200 - x * 50) as u8);
        let m = max_fuse(&[a.clone(), b.clone()]).unwrap();
        let row: Vec<u32> = (0..5).map(|x| m.get_pixel(x, 1).unwrap()).collect();
        assert_eq!(row, vec![200, 150, 100, 150, 200]);

        let blended = blend_gray(&a, 0.95, &b, 0.05).unwrap();
        // 0.95 * 100 + 0.05 * 100
        assert_eq!(blended.get_pixel(2, 0), Some(100));
        // 0.95 * 200 + 0.05 * 0 = 190
        assert_eq!(blended.get_pixel(4, 0), Some(190));

        assert!(max_fuse(&[]).is_err());
        let c = gray(4, 2, |_, _| 0);
        assert!(max_fuse(&[a.clone(), c.clone()]).is_err());
        assert!(blend_gray(&a, 0.5, &c, 0.5).is_err());
    }

    #[test]
    fn test_bank_matches_sequential_fold() {
        let pix = gray(30, 24, |x, y| ((x * 37 + y * 11) % 256) as u8);
        let kernels: Vec<Kernel> = (0..4)
            .map(|i| {
                let mut k = Kernel::gabor(&crate::GaborParams {
                    theta: i as f64 * std::f64::consts::FRAC_PI_4,
                    ..Default::default()
                })
                .unwrap();
                k.normalize_by_sum(1.5).unwrap();
                k
            })
            .collect();
        let bank = gabor_bank_response(&pix, &kernels, BorderPolicy::Replicate).unwrap();
        let seq: Vec<Pix> = kernels
            .iter()
            .map(|k| convolve_gray(&pix, k, BorderPolicy::Replicate).unwrap())
            .collect();
        let expected = max_fuse(&seq).unwrap();
        assert_eq!(bank.data(), expected.data());
    }
}
