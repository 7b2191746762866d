//! Error types for vein-color

use thiserror::Error;

/// Errors that can occur during color processing and thresholding
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] vein_core::Error),

    /// Filter error from windowed statistics
    #[error("filter error: {0}")]
    Filter(#[from] vein_filter::FilterError),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
