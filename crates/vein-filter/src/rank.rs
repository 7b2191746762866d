//! Rank filtering operations
//!
//! Order-statistic filters over rectangular windows with replicated
//! borders. A running 256-bin histogram is slid along each row, so the
//! cost per pixel is proportional to the window height.

use crate::{FilterError, FilterResult, check_grayscale};
use vein_core::{Pix, PixelDepth};

/// Apply a rank filter to an 8 bpp grayscale image.
///
/// # Arguments
///
/// * `pix` - 8 bpp input
/// * `width` - Filter window width (odd)
/// * `height` - Filter window height (odd)
/// * `rank` - Rank in `[0.0, 1.0]` (0.0 = min, 0.5 = median, 1.0 = max)
///
/// Pixels outside the image repeat the nearest edge pixel.
pub fn rank_filter_gray(pix: &Pix, width: u32, height: u32, rank: f32) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "rank filter window must be odd, got {}x{}",
            width, height
        )));
    }
    if !(0.0..=1.0).contains(&rank) {
        return Err(FilterError::InvalidParameters(format!(
            "rank must be in [0, 1], got {}",
            rank
        )));
    }

    let (w, h) = pix.dimensions();
    if width == 1 && height == 1 {
        return Ok(pix.clone());
    }

    let hw = (width / 2) as i32;
    let hh = (height / 2) as i32;
    let count = width * height;
    // 1-based position in sorted order
    let target = (rank * (count - 1) as f32).round() as u32 + 1;
    let clamp_x = |x: i32| x.clamp(0, w as i32 - 1) as u32;
    let clamp_y = |y: i32| y.clamp(0, h as i32 - 1) as u32;

    let mut out = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();

    for y in 0..h as i32 {
        let rows: Vec<u32> = (y - hh..=y + hh).map(clamp_y).collect();
        let mut hist = [0u32; 256];
        for dx in -hw..=hw {
            let sx = clamp_x(dx);
            for &sy in &rows {
                hist[pix.get_pixel_unchecked(sx, sy) as usize] += 1;
            }
        }

        for x in 0..w as i32 {
            if x > 0 {
                let leaving = clamp_x(x - hw - 1);
                let entering = clamp_x(x + hw);
                for &sy in &rows {
                    hist[pix.get_pixel_unchecked(leaving, sy) as usize] -= 1;
                    hist[pix.get_pixel_unchecked(entering, sy) as usize] += 1;
                }
            }
            out.set_pixel_unchecked(x as u32, y as u32, select(&hist, target));
        }
    }

    Ok(out.into())
}

/// Value at the 1-based sorted position `target` of a histogram.
#[inline]
fn select(hist: &[u32; 256], target: u32) -> u32 {
    let mut acc = 0;
    for (v, &c) in hist.iter().enumerate() {
        acc += c;
        if acc >= target {
            return v as u32;
        }
    }
    255
}

/// Apply a median filter (rank = 0.5).
pub fn median_filter(pix: &Pix, width: u32, height: u32) -> FilterResult<Pix> {
    rank_filter_gray(pix, width, height, 0.5)
}
