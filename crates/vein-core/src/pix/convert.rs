//! Pixel depth conversion functions
//!
//! Conversions between the binary, grayscale and RGB depths used by the
//! pipeline. Binary images treat a set bit as foreground, which maps to
//! white (255) at 8 bpp.

use super::{Pix, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

impl Pix {
    /// Convert any supported depth to 8-bit grayscale.
    ///
    /// Conversion rules:
    /// - **1 bpp**: 0 -> 0, 1 -> 255
    /// - **8 bpp**: shared clone
    /// - **32 bpp**: fixed-point luma (see [`color::luma`])
    ///
    /// # Examples
    ///
    /// ```
    /// use vein_core::{Pix, PixelDepth};
    ///
    /// let pix32 = Pix::new(10, 10, PixelDepth::Bit32).unwrap();
    /// let pix8 = pix32.convert_to_8().unwrap();
    /// assert_eq!(pix8.depth(), PixelDepth::Bit8);
    /// ```
    pub fn convert_to_8(&self) -> Result<Pix> {
        match self.depth() {
            PixelDepth::Bit8 => Ok(self.clone()),
            PixelDepth::Bit1 => self.convert_1_to_8(0, 255),
            PixelDepth::Bit32 => self.convert_rgb_to_luminance(),
        }
    }

    /// Collapse a 32 bpp RGB image to 8 bpp luma.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 32 bpp.
    pub fn convert_rgb_to_luminance(&self) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let (w, h) = self.dimensions();
        let mut result_mut = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();
        result_mut.set_informat(self.informat());
        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = color::extract_rgb(self.get_pixel_unchecked(x, y));
                result_mut.set_pixel_unchecked(x, y, color::luma(r, g, b) as u32);
            }
        }
        Ok(result_mut.into())
    }

    /// Convert 8 bpp grayscale to 32 bpp RGB by replicating gray into
    /// R=G=B.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn convert_8_to_32(&self) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }

        let (w, h) = self.dimensions();
        let mut result_mut = Pix::new(w, h, PixelDepth::Bit32)?.try_into_mut().unwrap();
        result_mut.set_informat(self.informat());

        let mut tab = [0u32; 256];
        for (i, entry) in tab.iter_mut().enumerate() {
            let v = i as u8;
            *entry = color::compose_rgb(v, v, v);
        }

        for y in 0..h {
            for x in 0..w {
                let val = self.get_pixel_unchecked(x, y) as usize;
                result_mut.set_pixel_unchecked(x, y, tab[val]);
            }
        }

        Ok(result_mut.into())
    }

    /// Convert 1 bpp to 8 bpp, mapping 0 -> `val0` and 1 -> `val1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp.
    pub fn convert_1_to_8(&self, val0: u8, val1: u8) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let (w, h) = self.dimensions();
        let mut result_mut = Pix::new(w, h, PixelDepth::Bit8)?.try_into_mut().unwrap();
        result_mut.set_informat(self.informat());
        for y in 0..h {
            for x in 0..w {
                let v = if self.get_pixel_unchecked(x, y) != 0 {
                    val1
                } else {
                    val0
                };
                result_mut.set_pixel_unchecked(x, y, v as u32);
            }
        }
        Ok(result_mut.into())
    }

    /// Convert 8 bpp to 1 bpp: every pixel with value `> thresh` is set.
    ///
    /// With `thresh = 0` any nonzero pixel becomes foreground.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn convert_8_to_1(&self, thresh: u8) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let (w, h) = self.dimensions();
        let mut result_mut = Pix::new(w, h, PixelDepth::Bit1)?.try_into_mut().unwrap();
        for y in 0..h {
            for x in 0..w {
                if self.get_pixel_unchecked(x, y) > thresh as u32 {
                    result_mut.set_pixel_unchecked(x, y, 1);
                }
            }
        }
        Ok(result_mut.into())
    }

    /// Count the set pixels of a 1 bpp image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp.
    pub fn count_pixels(&self) -> Result<u64> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let w = self.width();
        let full = (w / 32) as usize;
        let rem = w % 32;
        let tail_mask = if rem == 0 { 0 } else { !0u32 << (32 - rem) };
        let mut count = 0u64;
        for y in 0..self.height() {
            let line = self.row_data(y);
            count += line[..full]
                .iter()
                .map(|w| w.count_ones() as u64)
                .sum::<u64>();
            if rem != 0 {
                count += (line[full] & tail_mask).count_ones() as u64;
            }
        }
        Ok(count)
    }
}
