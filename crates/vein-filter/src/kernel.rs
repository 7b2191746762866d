//! Convolution kernels
//!
//! Defines the kernel structure used for correlation and the builder for
//! oriented Gabor kernels.

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

/// Parameters of a real-valued Gabor kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    /// Kernel side length (odd)
    pub size: u32,
    /// Gaussian envelope sigma along the wave direction
    pub sigma: f64,
    /// Orientation in radians
    pub theta: f64,
    /// Wavelength of the sinusoid in pixels
    pub lambda: f64,
    /// Spatial aspect ratio; the envelope sigma across the wave is
    /// `sigma / aspect`
    pub aspect: f64,
    /// Phase offset in radians
    pub psi: f64,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self {
            size: 15,
            sigma: 4.0,
            theta: 0.0,
            lambda: 10.0,
            aspect: 0.3,
            psi: 0.0,
        }
    }
}

impl Kernel {
    /// Create a new zero-filled kernel with the given dimensions.
    ///
    /// The center is placed at `(width / 2, height / 2)`.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from a slice of values in row-major order.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values for a {}x{} kernel, got {}",
                kernel.data.len(),
                width,
                height,
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Build a Gabor kernel.
    ///
    /// For each offset `(x, y)` from the center the weight is
    ///
    /// ```text
    /// xr = x cos(theta) + y sin(theta)
    /// yr = -x sin(theta) + y cos(theta)
    /// v  = exp(-0.5 (xr^2 / sx^2 + yr^2 / sy^2)) cos(2 pi xr / lambda + psi)
    /// ```
    ///
    /// with `sx = sigma` and `sy = sigma / aspect`. The value is computed in
    /// `f64` and stored point-reflected at `(cx - x, cy - y)`. The kernel is
    /// not normalized; see [`Kernel::normalize_by_sum`].
    pub fn gabor(params: &GaborParams) -> FilterResult<Self> {
        if params.size == 0 || params.size % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "Gabor kernel size must be odd, got {}",
                params.size
            )));
        }
        if !(params.sigma > 0.0 && params.lambda > 0.0 && params.aspect > 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "Gabor sigma, lambda and aspect must be positive, got {}, {}, {}",
                params.sigma, params.lambda, params.aspect
            )));
        }

        let mut kernel = Self::new(params.size, params.size)?;
        let half = (params.size / 2) as i32;
        let sigma_x = params.sigma;
        let sigma_y = params.sigma / params.aspect;
        let ex = -0.5 / (sigma_x * sigma_x);
        let ey = -0.5 / (sigma_y * sigma_y);
        let cscale = std::f64::consts::PI * 2.0 / params.lambda;
        let (s, c) = params.theta.sin_cos();

        for y in -half..=half {
            for x in -half..=half {
                let xr = x as f64 * c + y as f64 * s;
                let yr = -(x as f64) * s + y as f64 * c;
                let v = (ex * xr * xr + ey * yr * yr).exp() * (cscale * xr + params.psi).cos();
                kernel.set((half - x) as u32, (half - y) as u32, v as f32);
            }
        }
        Ok(kernel)
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate.
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate.
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Set a value at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Get the sum of all kernel values.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Divide every weight by `factor * sum()`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] if the scaled sum is zero
    /// (to within `f32::EPSILON`) or not finite.
    pub fn normalize_by_sum(&mut self, factor: f32) -> FilterResult<()> {
        let denom = factor * self.sum();
        if !denom.is_finite() || denom.abs() <= f32::EPSILON {
            return Err(FilterError::InvalidKernel(format!(
                "cannot normalize kernel: factor * sum = {}",
                denom
            )));
        }
        for v in &mut self.data {
            *v /= denom;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_new_and_access() {
        let mut k = Kernel::new(3, 5).unwrap();
        assert_eq!((k.center_x(), k.center_y()), (1, 2));
        k.set(2, 4, 1.5);
        assert_eq!(k.get(2, 4), Some(1.5));
        assert_eq!(k.get(3, 0), None);
        assert!(Kernel::new(0, 3).is_err());
    }

    #[test]
    fn test_from_slice_length() {
        assert!(Kernel::from_slice(2, 2, &[1.0, 2.0, 3.0]).is_err());
        let k = Kernel::from_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(k.get(1, 1), Some(4.0));
        assert_eq!(k.sum(), 10.0);
    }

    #[test]
    fn test_gabor_center_and_symmetry() {
        let k = Kernel::gabor(&GaborParams::default()).unwrap();
        assert_eq!(k.width(), 15);
        assert!((k.get(7, 7).unwrap() - 1.0).abs() < 1e-6);
        // Real Gabor with zero phase is point-symmetric
        for y in 0..15 {
            for x in 0..15 {
                let a = k.get(x, y).unwrap();
                let b = k.get(14 - x, 14 - y).unwrap();
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_gabor_orientation_swaps_axes() {
        let k0 = Kernel::gabor(&GaborParams::default()).unwrap();
        let k90 = Kernel::gabor(&GaborParams {
            theta: FRAC_PI_2,
            ..Default::default()
        })
        .unwrap();
        for y in 0..15 {
            for x in 0..15 {
                let a = k0.get(x, y).unwrap();
                let b = k90.get(y, x).unwrap();
                assert!((a - b).abs() < 1e-5, "({}, {}): {} vs {}", x, y, a, b);
            }
        }
    }

    #[test]
    fn test_gabor_rejects_even_size() {
        let params = GaborParams {
            size: 14,
            ..Default::default()
        };
        assert!(Kernel::gabor(&params).is_err());
    }

    #[test]
    fn test_normalize_by_sum() {
        let mut k = Kernel::from_slice(3, 1, &[1.0, 2.0, 1.0]).unwrap();
        k.normalize_by_sum(2.0).unwrap();
        assert!((k.sum() - 0.5).abs() < 1e-6);
        assert!((k.get(1, 0).unwrap() - 0.25).abs() < 1e-6);

        let mut zero = Kernel::from_slice(2, 1, &[1.0, -1.0]).unwrap();
        assert!(matches!(
            zero.normalize_by_sum(1.5),
            Err(FilterError::InvalidKernel(_))
        ));
    }
}
