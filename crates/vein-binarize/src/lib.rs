//! vein-binarize - Finger-vein ridge binarization
//!
//! Turns a low-contrast grayscale vein photograph into a 0/255 ridge map
//! through a fixed chain of stages (see [`pipeline`]). All constants come
//! from [`PipelineConfig`].
//!
//! # Examples
//!
//! ```
//! use vein_binarize::{PipelineConfig, binarize};
//! use vein_core::Pix;
//!
//! let pix = Pix::from_gray_bytes(40, 40, &[0u8; 1600]).unwrap();
//! let out = binarize(&pix, &PipelineConfig::default()).unwrap();
//! assert_eq!(out.dimensions(), (40, 40));
//! ```
//!
//! Set `RUST_LOG=debug` to see per-stage timings.

pub mod config;
mod error;
pub mod pipeline;

use std::fs::{self, File};
use std::path::Path;

use log::{debug, info};
use vein_core::Pix;

pub use config::{
    BorderMode, ClaheConfig, CleanupConfig, Connectivity, DiffusionConfig, GaborConfig,
    PipelineConfig, SauvolaConfig,
};
pub use error::{BinarizeError, BinarizeResult, Stage, StageError};
pub use pipeline::{Pipeline, StageImages};

/// Binarize an image buffer.
///
/// Accepts 1, 8 or 32 bpp input and returns an 8 bpp image of the same
/// size holding only 0 and 255.
pub fn binarize(pix: &Pix, config: &PipelineConfig) -> BinarizeResult<Pix> {
    Pipeline::new(config.clone())?.run(pix)
}

/// Read `input`, binarize it, and write the result to `output` if given.
///
/// Parent directories of `output` are created. The output format follows
/// its extension.
///
/// # Errors
///
/// - [`BinarizeError::InputNotFound`] if `input` is not a file that can be
///   opened
/// - [`BinarizeError::Decode`] if it cannot be decoded
/// - [`BinarizeError::Write`] if the result cannot be written; the error
///   carries the computed image
pub fn binarize_file(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &PipelineConfig,
) -> BinarizeResult<Pix> {
    let input = input.as_ref();
    let pipeline = Pipeline::new(config.clone())?;
    let pix = read_input(input)?;

    let result = pipeline.run(&pix)?;
    info!(
        "binarized {}: {} of {} pixels foreground",
        input.display(),
        foreground_count(&result),
        result.width() as u64 * result.height() as u64
    );

    if let Some(output) = output {
        write_output(&result, output)?;
    }
    Ok(result)
}

/// Decode an input image, distinguishing a missing file from a bad one.
///
/// A path that is not a regular file, or that cannot be opened (for
/// example for lack of permission), is [`BinarizeError::InputNotFound`].
/// Any failure after the file is open is [`BinarizeError::Decode`].
pub fn read_input(path: &Path) -> BinarizeResult<Pix> {
    let not_found = || BinarizeError::InputNotFound {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(not_found());
    }
    if let Err(e) = File::open(path) {
        debug!("cannot open {}: {}", path.display(), e);
        return Err(not_found());
    }
    vein_io::read_image(path).map_err(|source| BinarizeError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Write an image, creating parent directories. The format follows the
/// extension of `path`.
pub fn write_output(pix: &Pix, path: &Path) -> BinarizeResult<()> {
    let fail = |source: vein_io::IoError| BinarizeError::Write {
        path: path.to_path_buf(),
        source,
        image: pix.clone(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(e.into()))?;
    }
    vein_io::write_image_auto(pix, path).map_err(fail)
}

fn foreground_count(pix: &Pix) -> u64 {
    (0..pix.height())
        .map(|y| {
            (0..pix.width())
                .filter(|&x| pix.get_pixel_unchecked(x, y) != 0)
                .count() as u64
        })
        .sum()
}
