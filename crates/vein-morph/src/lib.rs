//! vein-morph - Binary morphology
//!
//! This crate provides:
//!
//! - Structuring elements (SEL): bricks and ellipses
//! - Binary morphology on 1 bpp images: erosion, dilation, opening,
//!   closing, implemented with word-level shifts
//! - Pair masking: blacking out a target image where a reference image is
//!   black

pub mod binary;
mod error;
pub mod morphapp;
pub mod sel;

pub use error::{MorphError, MorphResult};
pub use sel::Sel;

pub use binary::{close, dilate, dilate_brick, erode, erode_brick, open, open_brick, open_ellipse};

pub use morphapp::{PAIR_MASK_DILATION, apply_black_mask, black_mask, mask_pair};
