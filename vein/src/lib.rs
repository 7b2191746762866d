//! vein - Finger-vein image binarization
//!
//! Facade over the workspace crates. The pipeline itself lives in
//! [`binarize`]; the other modules expose the building blocks it is made
//! of.
//!
//! # Overview
//!
//! - Image I/O (PNG, JPEG, BMP, PNM)
//! - Tone curves, anisotropic diffusion, CLAHE and the Gabor ridge bank
//! - Sauvola thresholding and highlight suppression
//! - Binary morphology and connected-component filtering
//!
//! # Example
//!
//! ```
//! use vein::{Pix, PixelDepth};
//! use vein::binarize::{PipelineConfig, binarize};
//!
//! let pix = Pix::new(64, 48, PixelDepth::Bit8).unwrap();
//! let ridges = binarize(&pix, &PipelineConfig::default()).unwrap();
//! assert_eq!(ridges.dimensions(), (64, 48));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use vein_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use vein_binarize as binarize;
pub use vein_color as color;
pub use vein_filter as filter;
pub use vein_io as io;
pub use vein_morph as morph;
pub use vein_region as region;
