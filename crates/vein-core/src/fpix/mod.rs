//! FPix - Floating-point image
//!
//! `FPix` is a 2D array of `f32` values used for the intermediate results
//! of the pipeline (diffusion state, local means and deviations,
//! thresholds) where integer precision is insufficient.
//!
//! # Examples
//!
//! ```
//! use vein_core::FPix;
//!
//! let mut fpix = FPix::new(100, 100).unwrap();
//! fpix.set_pixel(10, 20, 0.5).unwrap();
//! assert_eq!(fpix.get_pixel(10, 20).unwrap(), 0.5);
//! ```

use crate::error::{Error, Result};
use crate::pix::{Pix, PixelDepth};

/// How to round values when converting FPix to an 8 bpp Pix.
///
/// Values are always clamped to `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Discard the fractional part
    Truncate,
    /// Round half away from zero
    HalfUp,
    /// Round half to even
    #[default]
    HalfEven,
}

impl Rounding {
    /// Apply this rounding mode and clamp to the 8-bit range.
    #[inline]
    pub fn apply(self, value: f32) -> u8 {
        let v = match self {
            Rounding::Truncate => value.trunc(),
            Rounding::HalfUp => value.round(),
            Rounding::HalfEven => value.round_ties_even(),
        };
        v.clamp(0.0, 255.0) as u8
    }
}

/// Floating-point image
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The pixel at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FPix {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<f32>,
}

impl FPix {
    /// Create a new FPix with all pixels set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, 0.0)
    }

    /// Create a new FPix with all pixels set to the specified value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(FPix {
            width,
            height,
            data: vec![value; size],
        })
    }

    /// Create a FPix from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are 0 or `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(FPix {
            width,
            height,
            data,
        })
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get a pixel value
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if the coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<f32> {
        self.check_bounds(x, y)?;
        Ok(self.get_pixel_unchecked(x, y))
    }

    /// Set a pixel value
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        self.check_bounds(x, y)?;
        self.set_pixel_unchecked(x, y, value);
        Ok(())
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width as usize,
            });
        }
        if y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height as usize,
            });
        }
        Ok(())
    }

    /// Get a pixel value without bounds checking
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Set a pixel value without bounds checking
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: f32) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = value;
    }

    /// Get raw access to the data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get a row of data
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let start = (y as usize) * (self.width as usize);
        &self.data[start..start + self.width as usize]
    }

    /// Get a mutable row of data
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
        let start = (y as usize) * (self.width as usize);
        let end = start + self.width as usize;
        &mut self.data[start..end]
    }

    /// Create an FPix from an 8 bpp or 1 bpp Pix.
    ///
    /// 1 bpp pixels become 0.0 or 1.0.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedDepth` for 32 bpp input.
    pub fn from_pix(pix: &Pix) -> Result<Self> {
        if pix.depth() == PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(32));
        }
        let (w, h) = pix.dimensions();
        let mut data = Vec::with_capacity((w as usize) * (h as usize));
        for y in 0..h {
            for x in 0..w {
                data.push(pix.get_pixel_unchecked(x, y) as f32);
            }
        }
        FPix::from_data(w, h, data)
    }

    /// Convert to an 8 bpp Pix, clamping to `[0, 255]` after rounding.
    pub fn to_pix(&self, rounding: Rounding) -> Result<Pix> {
        let mut pm = Pix::new(self.width, self.height, PixelDepth::Bit8)?
            .try_into_mut()
            .unwrap();
        for y in 0..self.height {
            for (x, &v) in self.row(y).iter().enumerate() {
                pm.set_pixel_unchecked(x as u32, y, rounding.apply(v) as u32);
            }
        }
        Ok(pm.into())
    }

    /// Minimum value, or `None` if any value is NaN
    pub fn min_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .try_fold(f32::INFINITY, |m, v| (!v.is_nan()).then(|| m.min(v)))
    }

    /// Maximum value, or `None` if any value is NaN
    pub fn max_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .try_fold(f32::NEG_INFINITY, |m, v| (!v.is_nan()).then(|| m.max(v)))
    }

    /// Mean value (accumulated in f64)
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }
}
