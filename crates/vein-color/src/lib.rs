//! vein-color - Color space and thresholding for vein images
//!
//! This crate provides:
//!
//! - **Highlight suppression** ([`colorspace`]): lightness reduction in
//!   HLS space followed by a luma collapse to gray
//! - **Thresholding** ([`threshold`]): Sauvola local thresholds and their
//!   multi-window fusion

pub mod colorspace;
pub mod error;
pub mod threshold;

// Re-export core types
pub use vein_core;

pub use error::{ColorError, ColorResult};

pub use colorspace::{pix_convert_to_gray, suppress_highlights};

pub use threshold::{
    SauvolaParams, or_masks, sauvola_binarize, sauvola_multiscale, sauvola_threshold_map,
};
