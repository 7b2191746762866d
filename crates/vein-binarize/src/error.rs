//! Error types for vein-binarize

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use vein_core::Pix;

/// A pipeline stage, used to attribute errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Illumination,
    Denoise,
    Equalize,
    RidgeEnhance,
    Binarize,
    Clean,
}

impl Stage {
    /// Short name, also used for stage dump file names
    pub fn name(self) -> &'static str {
        match self {
            Stage::Load => "loaded",
            Stage::Illumination => "illuminated",
            Stage::Denoise => "denoised",
            Stage::Equalize => "equalized",
            Stage::RidgeEnhance => "ridges",
            Stage::Binarize => "binary",
            Stage::Clean => "cleaned",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised inside a stage by one of the processing crates
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Core(#[from] vein_core::Error),

    #[error(transparent)]
    Filter(#[from] vein_filter::FilterError),

    #[error(transparent)]
    Color(#[from] vein_color::ColorError),

    #[error(transparent)]
    Morph(#[from] vein_morph::MorphError),

    #[error(transparent)]
    Region(#[from] vein_region::RegionError),
}

/// Errors of the binarization pipeline
#[derive(Debug, Error)]
pub enum BinarizeError {
    /// Input path missing or unreadable
    #[error("input not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    /// Input exists but could not be decoded
    #[error("failed to decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: vein_io::IoError,
    },

    /// The result could not be persisted; the computed image is kept
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: vein_io::IoError,
        image: Pix,
    },

    /// A stage rejected its input or parameters
    #[error("stage '{stage}' failed")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// Invalid pipeline configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BinarizeError {
    pub(crate) fn in_stage<E: Into<StageError>>(stage: Stage) -> impl FnOnce(E) -> Self {
        move |e| BinarizeError::Stage {
            stage,
            source: e.into(),
        }
    }
}

/// Result type for pipeline operations
pub type BinarizeResult<T> = Result<T, BinarizeError>;
