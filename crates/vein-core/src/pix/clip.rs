//! Rectangle clipping operations for images

use super::{Pix, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    /// Extract a rectangular sub-region from the image.
    ///
    /// If the rectangle extends beyond the image bounds, it is clipped to
    /// the valid region.
    ///
    /// # Arguments
    ///
    /// * `x` - Left edge of the rectangle
    /// * `y` - Top edge of the rectangle
    /// * `w` - Width of the rectangle
    /// * `h` - Height of the rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The requested width or height is 0
    /// - The rectangle origin is outside the image bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use vein_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit8).unwrap();
    /// let clipped = pix.clip_rectangle(80, 60, 50, 50).unwrap();
    /// assert_eq!(clipped.width(), 20);
    /// assert_eq!(clipped.height(), 20);
    /// ```
    pub fn clip_rectangle(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Pix> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle has zero dimension: {}x{}",
                w, h
            )));
        }

        let src_w = self.width();
        let src_h = self.height();

        if x >= src_w || y >= src_h {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle origin ({}, {}) is outside image bounds ({}x{})",
                x, y, src_w, src_h
            )));
        }

        let clip_w = w.min(src_w - x);
        let clip_h = h.min(src_h - y);

        let depth = self.depth();
        let mut pixd_mut = Pix::new(clip_w, clip_h, depth)?.try_into_mut().unwrap();
        if depth == PixelDepth::Bit32 {
            pixd_mut.set_spp(self.spp());
        }
        pixd_mut.set_informat(self.informat());

        for dy in 0..clip_h {
            for dx in 0..clip_w {
                let val = self.get_pixel_unchecked(x + dx, y + dy);
                pixd_mut.set_pixel_unchecked(dx, dy, val);
            }
        }

        Ok(pixd_mut.into())
    }

    /// Crop two images to their overlapping region so they have the same size.
    ///
    /// Both images are cropped to the minimum of their widths and heights,
    /// taken from the upper-left corner. An image already at that size is
    /// returned as a shared clone.
    pub fn crop_to_match(&self, other: &Pix) -> Result<(Pix, Pix)> {
        let w = self.width().min(other.width());
        let h = self.height().min(other.height());

        let r1 = if self.dimensions() == (w, h) {
            self.clone()
        } else {
            self.clip_rectangle(0, 0, w, h)?
        };
        let r2 = if other.dimensions() == (w, h) {
            other.clone()
        } else {
            other.clip_rectangle(0, 0, w, h)?
        };

        Ok((r1, r2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_copies_values() {
        let mut pm = Pix::new(10, 10, PixelDepth::Bit8).unwrap().to_mut();
        pm.set_pixel(5, 6, 77).unwrap();
        let pix: Pix = pm.into();
        let c = pix.clip_rectangle(4, 4, 3, 3).unwrap();
        assert_eq!(c.dimensions(), (3, 3));
        assert_eq!(c.get_pixel(1, 2), Some(77));
    }

    #[test]
    fn test_clip_errors() {
        let pix = Pix::new(10, 10, PixelDepth::Bit1).unwrap();
        assert!(pix.clip_rectangle(0, 0, 0, 5).is_err());
        assert!(pix.clip_rectangle(10, 0, 5, 5).is_err());
    }

    #[test]
    fn test_crop_to_match() {
        let a = Pix::new(12, 7, PixelDepth::Bit8).unwrap();
        let b = Pix::new(9, 10, PixelDepth::Bit8).unwrap();
        let (ca, cb) = a.crop_to_match(&b).unwrap();
        assert_eq!(ca.dimensions(), (9, 7));
        assert_eq!(cb.dimensions(), (9, 7));
    }
}
