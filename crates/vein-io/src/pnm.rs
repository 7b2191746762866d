//! PNM (Portable Any Map) format support
//!
//! Reads and writes PBM (P4 binary), PGM (P5 binary), and
//! PPM (P6 binary) formats. ASCII variants are not supported.

use crate::{IoError, IoResult};
use std::io::{BufRead, Read, Write};
use vein_core::{Pix, PixelDepth, color};

/// Read one whitespace-delimited header token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte).map_err(IoError::Io)? == 0 {
            if token.is_empty() {
                return Err(IoError::InvalidData("truncated PNM header".to_string()));
            }
            return Ok(token);
        }
        let c = byte[0];
        if c == b'#' && token.is_empty() {
            let mut comment = Vec::new();
            reader
                .read_until(b'\n', &mut comment)
                .map_err(IoError::Io)?;
            continue;
        }
        if c.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            return Ok(token);
        }
        token.push(c as char);
    }
}

fn read_number<R: BufRead>(reader: &mut R, what: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM {}: '{}'", what, token)))
}

/// Read a PNM image (P4/P5/P6) from a reader.
///
/// # Returns
/// A `Pix` at 1 bpp (PBM), 8 bpp (PGM), or 32 bpp (PPM). Samples with a
/// maxval other than 255 are rescaled to 8 bits; 16-bit samples keep
/// their high byte.
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Pix> {
    let magic = read_token(&mut reader)?;
    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;

    let (depth, maxval) = match magic.as_str() {
        "P4" => (PixelDepth::Bit1, 1),
        "P5" => (PixelDepth::Bit8, read_number(&mut reader, "maxval")?),
        "P6" => (PixelDepth::Bit32, read_number(&mut reader, "maxval")?),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM type '{}'",
                other
            )));
        }
    };
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("invalid PNM maxval {}", maxval)));
    }

    let mut pix_mut = Pix::new(width, height, depth)?.try_into_mut().unwrap();

    if depth == PixelDepth::Bit1 {
        // PBM: 1 = black
        let mut row = vec![0u8; width.div_ceil(8) as usize];
        for y in 0..height {
            reader.read_exact(&mut row).map_err(IoError::Io)?;
            for x in 0..width {
                let bit = (row[(x / 8) as usize] >> (7 - (x % 8))) & 1;
                pix_mut.set_pixel_unchecked(x, y, (bit ^ 1) as u32);
            }
        }
        return Ok(pix_mut.into());
    }

    let sample_bytes = if maxval > 255 { 2 } else { 1 };
    let channels = if depth == PixelDepth::Bit32 { 3 } else { 1 };
    let scale = |raw: &[u8]| -> u8 {
        if sample_bytes == 2 || maxval == 255 {
            raw[0]
        } else {
            ((raw[0] as u32 * 255 + maxval / 2) / maxval).min(255) as u8
        }
    };

    let mut row = vec![0u8; width as usize * channels * sample_bytes];
    for y in 0..height {
        reader.read_exact(&mut row).map_err(IoError::Io)?;
        for x in 0..width as usize {
            let base = x * channels * sample_bytes;
            let val = if channels == 1 {
                scale(&row[base..]) as u32
            } else {
                let r = scale(&row[base..]);
                let g = scale(&row[base + sample_bytes..]);
                let b = scale(&row[base + 2 * sample_bytes..]);
                color::compose_rgb(r, g, b)
            };
            pix_mut.set_pixel_unchecked(x as u32, y, val);
        }
    }

    Ok(pix_mut.into())
}

/// Write a `Pix` as binary PNM to a writer.
///
/// Chooses P4 (1 bpp), P5 (8 bpp grayscale), or P6 (32 bpp RGB)
/// based on the pixel depth. In P4 a set (white) pixel is written as 0.
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let (width, height) = pix.dimensions();
    let mut out = Vec::new();

    match pix.depth() {
        PixelDepth::Bit1 => {
            out.extend_from_slice(format!("P4\n{} {}\n", width, height).as_bytes());
            let bytes_per_row = width.div_ceil(8) as usize;
            for y in 0..height {
                let mut row = vec![0u8; bytes_per_row];
                for x in 0..width {
                    if pix.get_pixel_unchecked(x, y) == 0 {
                        row[(x / 8) as usize] |= 1 << (7 - (x % 8));
                    }
                }
                out.extend_from_slice(&row);
            }
        }
        PixelDepth::Bit8 => {
            out.extend_from_slice(format!("P5\n{} {}\n255\n", width, height).as_bytes());
            for y in 0..height {
                for x in 0..width {
                    out.push(pix.get_pixel_unchecked(x, y) as u8);
                }
            }
        }
        PixelDepth::Bit32 => {
            out.extend_from_slice(format!("P6\n{} {}\n255\n", width, height).as_bytes());
            for y in 0..height {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    out.extend_from_slice(&[r, g, b]);
                }
            }
        }
    }

    writer.write_all(&out).map_err(IoError::Io)?;
    Ok(())
}
