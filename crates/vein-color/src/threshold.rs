//! Local adaptive thresholding
//!
//! Sauvola's method sets a per-pixel threshold from the mean `m` and
//! standard deviation `s` of a window centered on the pixel:
//!
//! ```text
//! t = m * (1 + k * (s / r - 1))
//! ```
//!
//! A pixel is foreground when its value is strictly greater than `t`.
//! Windows are clamped to the image at the border. Several window sizes
//! can be evaluated independently and OR-fused.

use crate::{ColorError, ColorResult};
use rayon::prelude::*;
use vein_core::{FPix, Pix, PixelDepth};
use vein_filter::local_mean_std;

/// Multi-window Sauvola parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SauvolaParams {
    /// Odd window sizes, fused in this order
    pub windows: Vec<u32>,
    /// Sensitivity to local deviation
    pub k: f32,
    /// Dynamic range of the standard deviation
    pub r: f32,
}

impl Default for SauvolaParams {
    fn default() -> Self {
        Self {
            windows: vec![27, 31, 35],
            k: 0.06,
            r: 128.0,
        }
    }
}

fn check_8bpp(pix: &Pix) -> ColorResult<()> {
    if pix.depth() != PixelDepth::Bit8 {
        return Err(ColorError::UnsupportedDepth {
            expected: "8 bpp grayscale",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

fn check_window(window: u32) -> ColorResult<()> {
    if window == 0 || window % 2 == 0 {
        return Err(ColorError::InvalidParameters(format!(
            "Sauvola window must be odd, got {}",
            window
        )));
    }
    Ok(())
}

fn check_range(r: f32) -> ColorResult<()> {
    if !r.is_finite() || r <= 0.0 {
        return Err(ColorError::InvalidParameters(format!(
            "Sauvola r must be > 0, got {}",
            r
        )));
    }
    Ok(())
}

/// Compute the Sauvola threshold map of an 8 bpp image.
///
/// # Errors
///
/// Returns an error if the image is not 8 bpp, `window` is even or zero,
/// or `r` is not positive.
pub fn sauvola_threshold_map(pix: &Pix, window: u32, k: f32, r: f32) -> ColorResult<FPix> {
    check_8bpp(pix)?;
    check_window(window)?;
    check_range(r)?;

    let stats = local_mean_std(pix, window)?;
    let (w, h) = pix.dimensions();
    let mut thresh = FPix::new(w, h)?;
    for ((t, &m), &s) in thresh
        .data_mut()
        .iter_mut()
        .zip(stats.mean.data())
        .zip(stats.std_dev.data())
    {
        *t = m * (1.0 + k * (s / r - 1.0));
    }
    Ok(thresh)
}

/// Binarize an 8 bpp image with a single Sauvola window.
///
/// Returns a 1 bpp image whose set pixels are those strictly above the
/// local threshold.
pub fn sauvola_binarize(pix: &Pix, window: u32, k: f32, r: f32) -> ColorResult<Pix> {
    let thresh = sauvola_threshold_map(pix, window, k, r)?;
    let (w, h) = pix.dimensions();
    let mut out = Pix::new(w, h, PixelDepth::Bit1)?.try_into_mut().unwrap();
    for y in 0..h {
        let trow = thresh.row(y);
        for x in 0..w {
            if pix.get_pixel_unchecked(x, y) as f32 > trow[x as usize] {
                out.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    Ok(out.into())
}

/// OR together a set of same-size 1 bpp masks.
///
/// # Errors
///
/// Returns an error for an empty set, a non-binary mask or a size
/// mismatch.
pub fn or_masks(masks: &[Pix]) -> ColorResult<Pix> {
    let Some((first, rest)) = masks.split_first() else {
        return Err(ColorError::InvalidParameters(
            "no masks to combine".to_string(),
        ));
    };
    for mask in masks {
        if mask.depth() != PixelDepth::Bit1 {
            return Err(ColorError::UnsupportedDepth {
                expected: "1 bpp",
                actual: mask.depth().bits(),
            });
        }
        first.check_same_size(mask)?;
    }

    let mut out = first.to_mut();
    for mask in rest {
        for (dst, src) in out.data_mut().iter_mut().zip(mask.data()) {
            *dst |= *src;
        }
    }
    Ok(out.into())
}

/// Binarize with several Sauvola windows and OR-fuse the masks.
///
/// Windows are evaluated in parallel and combined in the order given, so
/// the output is identical to a sequential run.
pub fn sauvola_multiscale(pix: &Pix, params: &SauvolaParams) -> ColorResult<Pix> {
    check_8bpp(pix)?;
    if params.windows.is_empty() {
        return Err(ColorError::InvalidParameters(
            "at least one Sauvola window is required".to_string(),
        ));
    }
    for &window in &params.windows {
        check_window(window)?;
    }
    check_range(params.r)?;

    let masks = params
        .windows
        .par_iter()
        .map(|&window| sauvola_binarize(pix, window, params.k, params.r))
        .collect::<ColorResult<Vec<_>>>()?;
    or_masks(&masks)
}
