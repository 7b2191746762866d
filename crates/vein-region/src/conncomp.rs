//! Connected component analysis
//!
//! Two-pass labeling with a union-find (disjoint set) forest. The first
//! pass assigns provisional labels and records equivalences with already
//! visited neighbors; the second resolves every label to its root and
//! renumbers roots consecutively in raster order of their first pixel.

use crate::error::{RegionError, RegionResult};
use vein_core::{Pix, PixelDepth};

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

/// Inclusive bounding box of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl ComponentBounds {
    /// Width of the box in pixels
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Height of the box in pixels
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// A connected component in an image
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    /// Label, starting at 1
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: ComponentBounds,
    /// Mean x coordinate of the component's pixels
    pub centroid_x: f64,
    /// Mean y coordinate of the component's pixels
    pub centroid_y: f64,
}

struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // Index 0 is the background
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) -> u32 {
        let ra = self.find(a);
        let rb = self.find(b);
        // Keep the smaller root so labels follow raster order
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
        lo
    }
}

pub(crate) fn check_binary(pix: &Pix) -> RegionResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(RegionError::UnsupportedDepth {
            expected: "1 bpp binary",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}

/// Label a binary image into a flat label buffer.
///
/// Returns the labels (row-major, 0 for background) and the number of
/// components.
pub(crate) fn label_buffer(pix: &Pix, connectivity: ConnectivityType) -> (Vec<u32>, u32) {
    let (w, h) = pix.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let mut labels = vec![0u32; wu * hu];
    let mut uf = UnionFind::new();

    for y in 0..hu {
        for x in 0..wu {
            if pix.get_pixel_unchecked(x as u32, y as u32) == 0 {
                continue;
            }
            let mut current = 0u32;
            let mut visit = |n: u32, uf: &mut UnionFind| {
                if n != 0 {
                    current = if current == 0 { uf.find(n) } else { uf.union(current, n) };
                }
            };
            if x > 0 {
                visit(labels[y * wu + x - 1], &mut uf);
            }
            if y > 0 {
                let up = (y - 1) * wu;
                visit(labels[up + x], &mut uf);
                if connectivity == ConnectivityType::EightWay {
                    if x > 0 {
                        visit(labels[up + x - 1], &mut uf);
                    }
                    if x + 1 < wu {
                        visit(labels[up + x + 1], &mut uf);
                    }
                }
            }
            labels[y * wu + x] = if current == 0 { uf.make_set() } else { current };
        }
    }

    // Resolve roots and renumber consecutively
    let mut remap = vec![0u32; uf.parent.len()];
    let mut next = 0u32;
    for label in labels.iter_mut().filter(|l| **l != 0) {
        let root = uf.find(*label);
        if remap[root as usize] == 0 {
            next += 1;
            remap[root as usize] = next;
        }
        *label = remap[root as usize];
    }
    (labels, next)
}

/// Label all connected components in a binary image
///
/// Returns a 32 bpp image where each pixel holds the label of its
/// component (0 for background, 1..=n in raster order of each component's
/// first pixel).
pub fn label_connected_components(pix: &Pix, connectivity: ConnectivityType) -> RegionResult<Pix> {
    check_binary(pix)?;
    let (w, h) = pix.dimensions();
    let (labels, _) = label_buffer(pix, connectivity);
    let mut out = Pix::new(w, h, PixelDepth::Bit32)?.try_into_mut().unwrap();
    for (y, row) in labels.chunks_exact(w as usize).enumerate() {
        out.row_data_mut(y as u32).copy_from_slice(row);
    }
    Ok(out.into())
}

/// Find all connected components in a binary image
///
/// Components are returned in label order with pixel count, bounding box
/// and centroid.
pub fn find_connected_components(
    pix: &Pix,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<ConnectedComponent>> {
    check_binary(pix)?;
    let w = pix.width() as usize;
    let (labels, count) = label_buffer(pix, connectivity);

    #[derive(Clone, Copy)]
    struct Accum {
        count: u32,
        sum_x: u64,
        sum_y: u64,
        bounds: ComponentBounds,
    }

    let mut acc: Vec<Option<Accum>> = vec![None; count as usize];
    for (i, &label) in labels.iter().enumerate() {
        if label == 0 {
            continue;
        }
        let (x, y) = ((i % w) as u32, (i / w) as u32);
        let a = acc[label as usize - 1].get_or_insert(Accum {
            count: 0,
            sum_x: 0,
            sum_y: 0,
            bounds: ComponentBounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
        });
        a.count += 1;
        a.sum_x += x as u64;
        a.sum_y += y as u64;
        a.bounds.min_x = a.bounds.min_x.min(x);
        a.bounds.max_x = a.bounds.max_x.max(x);
        a.bounds.max_y = y;
    }

    Ok(acc
        .into_iter()
        .enumerate()
        .filter_map(|(i, a)| {
            a.map(|a| ConnectedComponent {
                label: i as u32 + 1,
                pixel_count: a.count,
                bounds: a.bounds,
                centroid_x: a.sum_x as f64 / a.count as f64,
                centroid_y: a.sum_y as f64 / a.count as f64,
            })
        })
        .collect())
}

/// Get pixel count for each component of a labeled image.
///
/// The index corresponds to `label - 1`.
pub fn get_component_sizes(labeled: &Pix) -> RegionResult<Vec<u32>> {
    if labeled.depth() != PixelDepth::Bit32 {
        return Err(RegionError::UnsupportedDepth {
            expected: "32 bpp (labeled image)",
            actual: labeled.depth().bits(),
        });
    }

    let mut counts: Vec<u32> = Vec::new();
    for y in 0..labeled.height() {
        for &label in &labeled.row_data(y)[..labeled.width() as usize] {
            if label == 0 {
                continue;
            }
            let idx = label as usize - 1;
            if idx >= counts.len() {
                counts.resize(idx + 1, 0);
            }
            counts[idx] += 1;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(w: u32, h: u32, on: &[(u32, u32)]) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for &(x, y) in on {
            pm.set_pixel(x, y, 1).unwrap();
        }
        pm.into()
    }

    #[test]
    fn test_diagonal_connectivity() {
        let pix = binary(5, 5, &[(0, 0), (1, 1), (2, 2), (4, 0)]);
        let eight = find_connected_components(&pix, ConnectivityType::EightWay).unwrap();
        assert_eq!(eight.len(), 2);
        assert_eq!(eight[0].pixel_count, 3);
        let four = find_connected_components(&pix, ConnectivityType::FourWay).unwrap();
        assert_eq!(four.len(), 4);
    }

    #[test]
    fn test_u_shape_merges() {
        // Two arms joined at the bottom: provisional labels must merge
        let mut on = Vec::new();
        for y in 0..5 {
            on.push((0, y));
            on.push((4, y));
        }
        for x in 1..4 {
            on.push((x, 4));
        }
        let pix = binary(5, 5, &on);
        let comps = find_connected_components(&pix, ConnectivityType::FourWay).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].pixel_count, 13);
        assert_eq!(comps[0].bounds.width(), 5);
        assert_eq!(comps[0].bounds.height(), 5);
    }

    #[test]
    fn test_label_image_and_sizes() {
        let pix = binary(40, 3, &[(0, 0), (1, 0), (35, 2)]);
        let labeled = label_connected_components(&pix, ConnectivityType::EightWay).unwrap();
        assert_eq!(labeled.get_pixel(1, 0), Some(1));
        assert_eq!(labeled.get_pixel(35, 2), Some(2));
        assert_eq!(labeled.get_pixel(2, 0), Some(0));
        assert_eq!(get_component_sizes(&labeled).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_centroid() {
        let pix = binary(10, 10, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let comps = find_connected_components(&pix, ConnectivityType::EightWay).unwrap();
        assert_eq!(comps[0].centroid_x, 2.5);
        assert_eq!(comps[0].centroid_y, 2.5);
    }

    #[test]
    fn test_rejects_gray() {
        let pix = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        assert!(find_connected_components(&pix, ConnectivityType::EightWay).is_err());
        assert!(get_component_sizes(&pix).is_err());
    }
}
