//! JPEG image format support
//!
//! Reads JPEG images with the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`. Grayscale decodes to 8 bpp, color to 32 bpp RGB.

use crate::{IoError, IoResult};
use jpeg_decoder::PixelFormat;
use std::io::{Read, Write};
use vein_core::{Pix, PixelDepth, color};

/// Default JPEG quality used by [`write_jpeg`] callers
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// # Returns
/// A `Pix` at 8 bpp (grayscale) or 32 bpp (RGB).
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let data = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG has no frame header".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let (depth, samples) = match info.pixel_format {
        PixelFormat::L8 => (PixelDepth::Bit8, 1usize),
        PixelFormat::L16 => (PixelDepth::Bit8, 2),
        PixelFormat::RGB24 => (PixelDepth::Bit32, 3),
        PixelFormat::CMYK32 => {
            return Err(IoError::UnsupportedFormat(
                "CMYK JPEG is not supported".to_string(),
            ));
        }
    };

    let expected = width as usize * height as usize * samples;
    if data.len() < expected {
        return Err(IoError::InvalidData(format!(
            "JPEG data too short: {} < {}",
            data.len(),
            expected
        )));
    }

    let mut pix_mut = Pix::new(width, height, depth)?.try_into_mut().unwrap();
    for y in 0..height {
        for x in 0..width {
            let idx = (y as usize * width as usize + x as usize) * samples;
            let val = match info.pixel_format {
                PixelFormat::L8 => data[idx] as u32,
                // 16-bit samples are big-endian; keep the high byte
                PixelFormat::L16 => data[idx] as u32,
                _ => color::compose_rgb(data[idx], data[idx + 1], data[idx + 2]),
            };
            pix_mut.set_pixel_unchecked(x, y, val);
        }
    }

    Ok(pix_mut.into())
}

/// Write a `Pix` as baseline JPEG.
///
/// 1 bpp images are expanded to 0/255 gray first.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if a dimension exceeds 65535 and
/// [`IoError::EncodeError`] if the encoder fails.
pub fn write_jpeg<W: Write>(pix: &Pix, writer: W, quality: u8) -> IoResult<()> {
    let (width, height) = pix.dimensions();
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(IoError::InvalidData(format!(
            "image too large for JPEG: {}x{}",
            width, height
        )));
    }

    let gray;
    let pix = match pix.depth() {
        PixelDepth::Bit1 => {
            gray = pix.convert_to_8()?;
            &gray
        }
        _ => pix,
    };

    let (color_type, data) = match pix.depth() {
        PixelDepth::Bit32 => {
            let mut data = Vec::with_capacity(width as usize * height as usize * 3);
            for y in 0..height {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    data.extend_from_slice(&[r, g, b]);
                }
            }
            (jpeg_encoder::ColorType::Rgb, data)
        }
        _ => {
            let mut data = Vec::with_capacity(width as usize * height as usize);
            for y in 0..height {
                for x in 0..width {
                    data.push(pix.get_pixel_unchecked(x, y) as u8);
                }
            }
            (jpeg_encoder::ColorType::Luma, data)
        }
    };

    let encoder = jpeg_encoder::Encoder::new(writer, quality);
    encoder
        .encode(&data, width as u16, height as u16, color_type)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;
    Ok(())
}
