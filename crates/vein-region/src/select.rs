//! Component selection by pixel count
//!
//! Keeps or drops whole connected components of a binary image depending
//! on how many pixels they contain.

use crate::conncomp::{ConnectivityType, check_binary, label_buffer};
use crate::error::{RegionError, RegionResult};
use vein_core::{Pix, PixelDepth};

/// Select connected components whose pixel count lies in
/// `min_count..=max_count`.
///
/// Returns a new 1 bpp image containing only the selected components.
///
/// # Errors
///
/// Returns an error if the input is not 1 bpp or `min_count > max_count`.
pub fn select_by_pixel_count(
    pix: &Pix,
    min_count: u32,
    max_count: u32,
    connectivity: ConnectivityType,
) -> RegionResult<Pix> {
    check_binary(pix)?;
    if min_count > max_count {
        return Err(RegionError::InvalidParameters(format!(
            "min_count {} exceeds max_count {}",
            min_count, max_count
        )));
    }

    let (labels, count) = label_buffer(pix, connectivity);
    let mut sizes = vec![0u32; count as usize + 1];
    for &label in &labels {
        sizes[label as usize] += 1;
    }
    // Index 0 is the background and is never kept
    let keep: Vec<bool> = sizes
        .iter()
        .enumerate()
        .map(|(label, n)| label != 0 && (min_count..=max_count).contains(n))
        .collect();
    if keep.iter().skip(1).all(|&k| k) {
        return Ok(pix.clone());
    }

    let (w, h) = pix.dimensions();
    let mut out = Pix::new(w, h, PixelDepth::Bit1)?.try_into_mut().unwrap();
    for (y, row) in labels.chunks_exact(w as usize).enumerate() {
        for (x, &label) in row.iter().enumerate() {
            if keep[label as usize] {
                out.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    Ok(out.into())
}

/// Remove connected components with fewer than `min_size` pixels.
///
/// A `min_size` of 0 or 1 keeps every component.
pub fn remove_small_components(
    pix: &Pix,
    min_size: u32,
    connectivity: ConnectivityType,
) -> RegionResult<Pix> {
    select_by_pixel_count(pix, min_size, u32::MAX, connectivity)
}
