//! Perona-Malik anisotropic diffusion
//!
//! Edge-preserving smoothing: each iteration moves every interior pixel
//! toward its four neighbors, weighted by a conductance that falls off
//! with the size of the local gradient. Large steps (edges) diffuse
//! little; small steps (noise) are flattened.

use crate::{FilterError, FilterResult, check_grayscale};
use vein_core::{FPix, Pix, Rounding};

/// Diffusion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionParams {
    /// Number of iterations
    pub iterations: u32,
    /// Gradient scale of the conductance `exp(-(d / kappa)^2)`
    pub kappa: f32,
    /// Step size of each update
    pub gamma: f32,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            iterations: 5,
            kappa: 100.0,
            gamma: 0.1,
        }
    }
}

#[inline]
fn flux(neighbor: f32, center: f32, kappa: f32) -> f32 {
    let d = neighbor - center;
    let s = d / kappa;
    (-(s * s)).exp() * d
}

/// Run one Jacobi step of diffusion on `src` into `dst`.
///
/// Border pixels are copied through unchanged.
fn diffuse_step(src: &FPix, dst: &mut FPix, params: &DiffusionParams) {
    let (w, h) = src.dimensions();
    dst.data_mut().copy_from_slice(src.data());

    for y in 1..h - 1 {
        let up = src.row(y - 1);
        let row = src.row(y);
        let down = src.row(y + 1);
        let out = dst.row_mut(y);
        for x in 1..(w - 1) as usize {
            let c = row[x];
            let sum = flux(up[x], c, params.kappa)
                + flux(down[x], c, params.kappa)
                + flux(row[x - 1], c, params.kappa)
                + flux(row[x + 1], c, params.kappa);
            out[x] = c + params.gamma * sum;
        }
    }
}

/// Apply anisotropic diffusion to an 8 bpp image.
///
/// The state is kept in `f32`; values are clipped to `[0, 255]` and
/// truncated only after the last iteration. Images with fewer than three
/// rows or columns have no interior and come back unchanged.
///
/// # Errors
///
/// Returns an error if the image is not 8 bpp or `kappa` is not positive.
pub fn anisotropic_diffusion(pix: &Pix, params: &DiffusionParams) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    if params.kappa.is_nan() || params.kappa <= 0.0 {
        return Err(FilterError::InvalidParameters(format!(
            "kappa must be > 0, got {}",
            params.kappa
        )));
    }

    let (w, h) = pix.dimensions();
    if w < 3 || h < 3 || params.iterations == 0 {
        return Ok(pix.clone());
    }

    let mut cur = FPix::from_pix(pix)?;
    let mut next = cur.clone();
    for _ in 0..params.iterations {
        diffuse_step(&cur, &mut next, params);
        std::mem::swap(&mut cur, &mut next);
    }

    Ok(cur.to_pix(Rounding::Truncate)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vein_core::PixelDepth;

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
    fn test_uniform_is_fixed_point() {
        let pix = gray(9, 7, |_, _| 87);
        let out = anisotropic_diffusion(&pix, &DiffusionParams::default()).unwrap();
        assert_eq!(out.data(), pix.data());
    }

    #[test]
    fn test_single_spike_one_step() {
        // One iteration: the spike loses 0.1 * 4 * exp(-1) * 100
        let pix = gray(5, 5, |x, y| if (x, y) == (2, 2) { 100 } else { 0 });
        let params = DiffusionParams {
            iterations: 1,
            ..Default::default()
        };
        let out = anisotropic_diffusion(&pix, &params).unwrap();
        let expected_center = 100.0 - 0.1 * 4.0 * (-1.0f32).exp() * 100.0;
        assert_eq!(out.get_pixel(2, 2), Some(expected_center as u32));
        let expected_neighbor = 0.1 * (-1.0f32).exp() * 100.0;
        assert_eq!(out.get_pixel(2, 1), Some(expected_neighbor as u32));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_border_untouched() {
        let pix = gray(6, 6, |x, y| ((x * 37 + y * 11) % 256) as u8);
        let out = anisotropic_diffusion(&pix, &DiffusionParams::default()).unwrap();
        for i in 0..6 {
            assert_eq!(out.get_pixel(i, 0), pix.get_pixel(i, 0));
            assert_eq!(out.get_pixel(i, 5), pix.get_pixel(i, 5));
            assert_eq!(out.get_pixel(0, i), pix.get_pixel(0, i));
            assert_eq!(out.get_pixel(5, i), pix.get_pixel(5, i));
        }
    }

    #[test]
    fn test_thin_images_unchanged() {
        let pix = gray(2, 9, |x, y| (x * 100 + y) as u8);
        let out = anisotropic_diffusion(&pix, &DiffusionParams::default()).unwrap();
        assert_eq!(out.data(), pix.data());
    }

    #[test]
    fn test_rejects_bad_input() {
        let bin = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        assert!(anisotropic_diffusion(&bin, &DiffusionParams::default()).is_err());
        let pix = gray(4, 4, |_, _| 0);
        let params = DiffusionParams {
            kappa: 0.0,
            ..Default::default()
        };
        assert!(anisotropic_diffusion(&pix, &params).is_err());
    }
}
