//! vein-region - Connected component analysis
//!
//! This crate provides:
//!
//! - **Labeling** ([`conncomp`]): 4- or 8-connected labeling of 1 bpp
//!   images with union-find, per-component size, bounds and centroid
//! - **Selection** ([`select`]): removal of components below a pixel count
//!
//! # Examples
//!
//! ```
//! use vein_region::{ConnectivityType, find_connected_components, remove_small_components};
//! use vein_core::{Pix, PixelDepth};
//!
//! let mut pix_mut = Pix::new(100, 100, PixelDepth::Bit1).unwrap().try_into_mut().unwrap();
//! pix_mut.set_pixel(10, 10, 1).unwrap();
//! pix_mut.set_pixel(11, 11, 1).unwrap();
//! pix_mut.set_pixel(50, 50, 1).unwrap();
//! let pix: Pix = pix_mut.into();
//!
//! let components = find_connected_components(&pix, ConnectivityType::EightWay).unwrap();
//! assert_eq!(components.len(), 2);
//!
//! let cleaned = remove_small_components(&pix, 2, ConnectivityType::EightWay).unwrap();
//! assert_eq!(cleaned.count_pixels().unwrap(), 2);
//! ```

pub mod conncomp;
pub mod error;
pub mod select;

pub use vein_core;

pub use error::{RegionError, RegionResult};

pub use conncomp::{
    ComponentBounds, ConnectedComponent, ConnectivityType, find_connected_components,
    get_component_sizes, label_connected_components,
};
pub use select::{remove_small_components, select_by_pixel_count};
