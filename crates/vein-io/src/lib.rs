//! vein-io - Image I/O for the vein pipeline
//!
//! Supported formats:
//!
//! | format | read | write | feature |
//! |---|---|---|---|
//! | BMP | yes | yes | `bmp` |
//! | PNM (P4/P5/P6) | yes | yes | `pnm` |
//! | PNG | yes | yes | `png-format` |
//! | JPEG | yes | yes | `jpeg` |
//!
//! Reading detects the format from the file's magic bytes. Writing takes
//! an explicit [`ImageFormat`], or infers it from the path extension with
//! [`write_image_auto`].

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_path};
pub use vein_core::ImageFormat;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use vein_core::Pix;

/// Read an image from a file path.
///
/// The format is detected from the file contents, not the extension.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path)?;
    let pix = read_image_format(BufReader::new(file), format)?;
    log::info!(
        "read {} ({:?}, {}x{}, {} bpp)",
        path.display(),
        format,
        pix.width(),
        pix.height(),
        pix.depth().bits()
    );
    Ok(pix)
}

/// Read an image from memory.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R: std::io::BufRead + std::io::Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<Pix> {
    let pix = match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(reader)?,
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(reader)?,
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader)?,
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(reader)?,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "reading {:?} is not enabled",
                other
            )));
        }
    };
    let mut pix_mut = pix.try_into_mut().unwrap();
    pix_mut.set_informat(format);
    Ok(pix_mut.into())
}

/// Write an image to memory in the given format.
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_format(pix, &mut buffer, format)?;
    Ok(buffer)
}

fn write_image_format<W: Write>(pix: &Pix, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(pix, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(pix, writer, jpeg::DEFAULT_JPEG_QUALITY),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(pix, writer),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(pix, writer),
        other => Err(IoError::UnsupportedFormat(format!(
            "writing {:?} is not enabled",
            other
        ))),
    }
}

/// Write an image to a file path in the given format.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_format(pix, &mut writer, format)?;
    writer.flush()?;
    log::info!(
        "wrote {} ({:?}, {}x{})",
        path.display(),
        format,
        pix.width(),
        pix.height()
    );
    Ok(())
}

/// Write an image, choosing the format from the path extension.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] when the extension is missing or
/// unknown; nothing is written in that case.
pub fn write_image_auto<P: AsRef<Path>>(pix: &Pix, path: P) -> IoResult<()> {
    let format = format_from_path(&path)?;
    write_image(pix, path, format)
}
