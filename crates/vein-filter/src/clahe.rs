//! Contrast-limited adaptive histogram equalization (CLAHE)
//!
//! The image is divided into a grid of tiles. Each tile gets its own
//! equalization table built from a clipped histogram, and each output
//! pixel blends the tables of the four nearest tile centers bilinearly.
//!
//! # Tiling
//!
//! When the image size is not a multiple of the grid, the image is
//! extended at the right and bottom by reflect-101 padding and the tile
//! size is computed on the extended image. The extension amount on each
//! axis is `tiles - size % tiles` (so an axis that already divides evenly
//! is still extended by a full `tiles` when the other one does not).
//! Only histograms read the padding; every output pixel corresponds to an
//! input pixel.

use crate::{FilterError, FilterResult, check_grayscale};
use vein_core::{Pix, PixelDepth, color};

const HIST_SIZE: usize = 256;

/// CLAHE parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaheParams {
    /// Clip limit as a multiple of the mean bin height; `<= 0` disables
    /// clipping
    pub clip_limit: f32,
    /// Number of tile columns
    pub tiles_x: u32,
    /// Number of tile rows
    pub tiles_y: u32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 1.0,
            tiles_x: 2,
            tiles_y: 2,
        }
    }
}

/// Reflect-101 index into `[0, n)` for an index at or past the end.
#[inline]
fn reflect101(i: u32, n: u32) -> u32 {
    if i < n {
        i
    } else if n == 1 {
        0
    } else {
        (2 * (n - 1)).saturating_sub(i)
    }
}

/// Clip a histogram at `limit` and redistribute the excess.
///
/// The excess is spread evenly over all bins; the remainder is added one
/// count per bin starting at bin 0 with step `max(256 / remainder, 1)`.
fn clip_histogram(hist: &mut [u32; HIST_SIZE], limit: u32) {
    let mut clipped = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE as u32;
    let mut residual = clipped - batch * HIST_SIZE as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual != 0 {
        let step = (HIST_SIZE / residual as usize).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

/// Build the equalization table for one tile histogram.
///
/// A histogram with a single occupied bin is a flat patch; it keeps the
/// identity mapping so uniform regions are not shifted to an arbitrary
/// level.
fn tile_lut(hist: &[u32; HIST_SIZE], limit: Option<u32>, lut_scale: f32) -> [u8; HIST_SIZE] {
    let mut lut = [0u8; HIST_SIZE];
    if hist.iter().filter(|&&c| c > 0).count() <= 1 {
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = i as u8;
        }
        return lut;
    }

    let mut hist = *hist;
    if let Some(limit) = limit {
        clip_histogram(&mut hist, limit);
    }

    let mut sum = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = color::saturate_u8(sum as f32 * lut_scale);
    }
    lut
}

/// Per-axis interpolation setup: the two tile indices and the weight of
/// the second one.
fn axis_weights(len: u32, tile: u32, tiles: u32) -> Vec<(usize, usize, f32)> {
    let inv = 1.0f32 / tile as f32;
    (0..len)
        .map(|p| {
            let tf = p as f32 * inv - 0.5;
            let t1 = tf.floor();
            let a = tf - t1;
            let t1 = t1 as i64;
            let i1 = t1.max(0) as usize;
            let i2 = (t1 + 1).min(tiles as i64 - 1) as usize;
            (i1, i2, a)
        })
        .collect()
}

/// Apply CLAHE to an 8 bpp image.
///
/// # Arguments
///
/// * `pix` - 8 bpp grayscale input
/// * `params` - Clip limit and tile grid
///
/// # Errors
///
/// Returns an error if the image is not 8 bpp, the grid has a zero
/// dimension, or a tile would be empty (grid larger than the image).
pub fn clahe(pix: &Pix, params: &ClaheParams) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    let (tiles_x, tiles_y) = (params.tiles_x, params.tiles_y);
    if tiles_x == 0 || tiles_y == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "tile grid must be positive, got {}x{}",
            tiles_x, tiles_y
        )));
    }

    let (w, h) = pix.dimensions();
    let (ext_w, ext_h) = if w % tiles_x == 0 && h % tiles_y == 0 {
        (w, h)
    } else {
        (w + tiles_x - w % tiles_x, h + tiles_y - h % tiles_y)
    };
    let tile_w = ext_w / tiles_x;
    let tile_h = ext_h / tiles_y;
    if tile_w == 0 || tile_h == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "tile grid {}x{} too fine for {}x{} image",
            tiles_x, tiles_y, w, h
        )));
    }

    let area = tile_w * tile_h;
    let lut_scale = (HIST_SIZE - 1) as f32 / area as f32;
    let limit = (params.clip_limit > 0.0).then(|| {
        let l = (params.clip_limit * area as f32 / HIST_SIZE as f32) as u32;
        l.max(1)
    });

    let mut luts = vec![[0u8; HIST_SIZE]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; HIST_SIZE];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(y, h);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect101(x, w);
                    hist[pix.get_pixel_unchecked(sx, sy) as usize] += 1;
                }
            }
            luts[(ty * tiles_x + tx) as usize] = tile_lut(&hist, limit, lut_scale);
        }
    }

    let xw = axis_weights(w, tile_w, tiles_x);
    let yw = axis_weights(h, tile_h, tiles_y);
    let mut out = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();

    for (y, &(ty1, ty2, ya)) in yw.iter().enumerate() {
        let ya1 = 1.0 - ya;
        let row1 = &luts[ty1 * tiles_x as usize..(ty1 + 1) * tiles_x as usize];
        let row2 = &luts[ty2 * tiles_x as usize..(ty2 + 1) * tiles_x as usize];
        for (x, &(tx1, tx2, xa)) in xw.iter().enumerate() {
            let xa1 = 1.0 - xa;
            let v = pix.get_pixel_unchecked(x as u32, y as u32) as usize;
            let res = (row1[tx1][v] as f32 * xa1 + row1[tx2][v] as f32 * xa) * ya1
                + (row2[tx1][v] as f32 * xa1 + row2[tx2][v] as f32 * xa) * ya;
            out.set_pixel_unchecked(x as u32, y as u32, color::saturate_u8(res) as u32);
        }
    }

    Ok(out.into())
}
