//! vein-filter - Image filtering operations
//!
//! This crate provides the grayscale filters of the vein pipeline:
//!
//! - Tone reproduction curves (gamma, linear contrast stretch)
//! - Perona-Malik anisotropic diffusion
//! - Contrast-limited adaptive histogram equalization (CLAHE)
//! - Kernels, the Gabor orientation bank and correlation with explicit
//!   border handling
//! - Windowed mean / standard deviation over integral images
//! - Rank filtering (median)

pub mod clahe;
pub mod convolve;
pub mod diffusion;
pub mod enhance;
mod error;
pub mod kernel;
pub mod rank;
pub mod windowed;

pub use error::{FilterError, FilterResult};
pub use kernel::{GaborParams, Kernel};

// Re-export commonly used functions
pub use clahe::{ClaheParams, clahe};
pub use convolve::{BorderPolicy, blend_gray, convolve_gray, gabor_bank_response, max_fuse};
pub use diffusion::{DiffusionParams, anisotropic_diffusion};
pub use enhance::{TrcLut, gamma_trc, gamma_trc_pix, linear_trc, linear_trc_pix, trc_map};
pub use rank::{median_filter, rank_filter_gray};
pub use windowed::{LocalStats, local_mean_std};

/// Validate that the input image is 8 bpp grayscale.
pub(crate) fn check_grayscale(pix: &vein_core::Pix) -> FilterResult<()> {
    if pix.depth() != vein_core::PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp grayscale",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
