//! Structuring Element (SEL) for morphological operations
//!
//! A structuring element defines the neighborhood used in morphological
//! operations. Only hit positions are stored; the origin is the reference
//! point placed on each pixel.

use crate::{MorphError, MorphResult};

/// Structuring Element (SEL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    hits: Vec<bool>,
}

impl Sel {
    /// Create a new empty structuring element with its origin at the
    /// center `(width / 2, height / 2)`.
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            hits: vec![false; (width * height) as usize],
        })
    }

    /// Create a rectangular "brick" structuring element with all hits
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::new(width, height)?;
        sel.hits.fill(true);
        Ok(sel)
    }

    /// Create a square structuring element with all hits
    pub fn create_square(size: u32) -> MorphResult<Self> {
        Self::create_brick(size, size)
    }

    /// Create an elliptical structuring element inscribed in a
    /// `width x height` box.
    ///
    /// Row `i` spans `c - dx ..= c + dx` with `r = height / 2`,
    /// `c = width / 2` and `dx = round(c * sqrt(1 - ((i - r) / r)^2))`.
    /// A 1x1 ellipse is a single hit at the origin.
    pub fn create_ellipse(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::new(width, height)?;
        let r = (height / 2) as i64;
        let c = (width / 2) as i64;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        for i in 0..height as i64 {
            let dy = i - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round_ties_even()
                as i64;
            let j1 = (c - dx).max(0);
            let j2 = (c + dx + 1).min(width as i64);
            for j in j1..j2 {
                sel.set(j as u32, i as u32, true);
            }
        }
        Ok(sel)
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

    /// Get the origin x coordinate
    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    /// Get the origin y coordinate
    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Whether (x, y) is a hit. Out-of-range coordinates are not.
    #[inline]
    pub fn is_hit(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.hits[(y * self.width + x) as usize]
    }

    /// Set or clear the hit at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, hit: bool) {
        if x < self.width && y < self.height {
            self.hits[(y * self.width + x) as usize] = hit;
        }
    }

    /// Count the number of hit elements
    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|&&h| h).count()
    }

    /// Iterate over hit positions relative to the origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let cx = self.cx as i32;
        let cy = self.cy as i32;
        let width = self.width;

        self.hits.iter().enumerate().filter_map(move |(idx, &hit)| {
            hit.then(|| {
                let x = (idx as u32 % width) as i32;
                let y = (idx as u32 / width) as i32;
                (x - cx, y - cy)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(sel: &Sel) -> Vec<String> {
        (0..sel.height())
            .map(|y| {
                (0..sel.width())
                    .map(|x| if sel.is_hit(x, y) { 'x' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_brick() {
        let sel = Sel::create_brick(5, 3).unwrap();
        assert_eq!(sel.hit_count(), 15);
        assert_eq!((sel.origin_x(), sel.origin_y()), (2, 1));
        assert!(Sel::create_brick(0, 3).is_err());
    }

    #[test]
    fn test_ellipse_shapes() {
        let one = Sel::create_ellipse(1, 1).unwrap();
        assert_eq!(one.hit_count(), 1);
        assert_eq!(one.hit_offsets().collect::<Vec<_>>(), vec![(0, 0)]);

        let e5 = Sel::create_ellipse(5, 5).unwrap();
        assert_eq!(rows(&e5), vec!["..x..", "xxxxx", "xxxxx", "xxxxx", "..x.."]);

        let e3 = Sel::create_ellipse(3, 3).unwrap();
        assert_eq!(rows(&e3), vec![".x.", "xxx", ".x."]);
    }

    #[test]
    fn test_hit_offsets_centered() {
        let sel = Sel::create_square(3).unwrap();
        let offsets: Vec<_> = sel.hit_offsets().collect();
        assert_eq!(offsets.len(), 9);
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }
}
