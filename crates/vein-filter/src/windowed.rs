//! Windowed statistics using integral images
//!
//! Computes local mean and standard deviation over square sliding windows
//! in O(1) per pixel, using summed area tables of the values and of their
//! squares. Windows are clamped to the image: near the border the
//! statistics cover only the in-image part of the window.

use crate::{FilterError, FilterResult, check_grayscale};
use vein_core::{FPix, Pix};

/// Local mean and standard deviation maps, same size as the source.
#[derive(Debug, Clone)]
pub struct LocalStats {
    /// Mean over the (clamped) window
    pub mean: FPix,
    /// Population standard deviation over the (clamped) window
    pub std_dev: FPix,
}

/// Summed area table with a leading zero row and column.
///
/// Entry `(x, y)` holds the sum over `[0, x) x [0, y)`. Sums are kept in
/// `f64`; squared sums of large images exceed the 24-bit mantissa of
/// `f32`.
struct IntegralImage {
    data: Vec<f64>,
    stride: usize,
}

impl IntegralImage {
    fn build(pix: &Pix, f: impl Fn(f64) -> f64) -> Self {
        let (w, h) = pix.dimensions();
        let stride = w as usize + 1;
        let mut data = vec![0.0f64; stride * (h as usize + 1)];
        for y in 0..h {
            let mut row_sum = 0.0;
            let base = (y as usize + 1) * stride;
            for x in 0..w {
                row_sum += f(pix.get_pixel_unchecked(x, y) as f64);
                data[base + x as usize + 1] = data[base - stride + x as usize + 1] + row_sum;
            }
        }
        Self { data, stride }
    }

    /// Sum over the half-open rectangle `[x0, x1) x [y0, y1)`.
    #[inline]
    fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let s = self.stride;
        self.data[y1 * s + x1] - self.data[y0 * s + x1] - self.data[y1 * s + x0]
            + self.data[y0 * s + x0]
    }
}

/// Compute the local mean and standard deviation of an 8 bpp image.
///
/// # Arguments
///
/// * `pix` - 8 bpp grayscale input
/// * `window` - Odd window side length; the window is centered on each
///   pixel
///
/// Variance is `max(0, E[x^2] - E[x]^2)` over the pixels of the window
/// that lie inside the image.
///
/// # Errors
///
/// Returns an error if the image is not 8 bpp or `window` is zero or even.
pub fn local_mean_std(pix: &Pix, window: u32) -> FilterResult<LocalStats> {
    check_grayscale(pix)?;
    if window == 0 || window % 2 == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "window size must be odd, got {}",
            window
        )));
    }

    let (w, h) = pix.dimensions();
    let sum = IntegralImage::build(pix, |v| v);
    let sum_sq = IntegralImage::build(pix, |v| v * v);
    let half = (window / 2) as usize;

    let mut mean = FPix::new(w, h)?;
    let mut std_dev = FPix::new(w, h)?;

    for y in 0..h as usize {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half + 1).min(h as usize);
        for x in 0..w as usize {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half + 1).min(w as usize);
            let n = ((x1 - x0) * (y1 - y0)) as f64;
            let m = sum.rect_sum(x0, y0, x1, y1) / n;
            let var = (sum_sq.rect_sum(x0, y0, x1, y1) / n - m * m).max(0.0);
            mean.set_pixel_unchecked(x as u32, y as u32, m as f32);
            std_dev.set_pixel_unchecked(x as u32, y as u32, var.sqrt() as f32);
        }
    }

    Ok(LocalStats { mean, std_dev })
}
