//! BMP image format support
//!
//! Reads and writes uncompressed Windows Bitmap (BMP) files.
//! Palette images are resolved through their palette on read: a gray
//! palette gives 8 bpp, any other palette gives 32 bpp RGB.

use crate::{IoError, IoResult};
use std::io::{Read, Write};
use vein_core::{Pix, PixelDepth, color};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Read a BMP image
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header).map_err(IoError::Io)?;

    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }

    let pixel_offset = le_u32(&file_header[10..14]) as usize;

    let mut info_header = [0u8; 40];
    reader.read_exact(&mut info_header).map_err(IoError::Io)?;

    let header_size = le_u32(&info_header[0..4]);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {}",
            header_size
        )));
    }

    let width = le_i32(&info_header[4..8]);
    let height = le_i32(&info_header[8..12]);

    let planes = le_u16(&info_header[12..14]);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {}",
            planes
        )));
    }

    let bits_per_pixel = le_u16(&info_header[14..16]);
    let compression = le_u32(&info_header[16..20]);
    let colors_used = le_u32(&info_header[32..36]) as usize;

    // BI_RGB and BI_BITFIELDS with the default masks only
    if compression != 0 && compression != 3 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {}",
            compression
        )));
    }

    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24 | 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP bit depth: {}",
            bits_per_pixel
        )));
    }

    let top_down = height < 0;
    let width = width.unsigned_abs();
    let height = height.unsigned_abs();

    let extra = header_size as usize - BMP_INFO_HEADER_SIZE as usize;
    if extra > 0 {
        let mut skip = vec![0u8; extra];
        reader.read_exact(&mut skip).map_err(IoError::Io)?;
    }

    let palette: Vec<(u8, u8, u8)> = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 {
            max_colors
        } else {
            colors_used.min(max_colors)
        };
        let mut raw = vec![0u8; num_colors * 4];
        reader.read_exact(&mut raw).map_err(IoError::Io)?;
        raw.chunks_exact(4).map(|c| (c[2], c[1], c[0])).collect()
    } else {
        Vec::new()
    };

    let current_pos = BMP_FILE_HEADER_SIZE + header_size as usize + palette.len() * 4;
    if pixel_offset > current_pos {
        let mut skip = vec![0u8; pixel_offset - current_pos];
        reader.read_exact(&mut skip).map_err(IoError::Io)?;
    }

    let gray_palette = palette.iter().all(|&(r, g, b)| r == g && g == b);
    let depth = if bits_per_pixel <= 8 && gray_palette {
        PixelDepth::Bit8
    } else {
        PixelDepth::Bit32
    };

    let mut pix_mut = Pix::new(width, height, depth)?.try_into_mut().unwrap();

    let lookup = |index: usize| -> IoResult<u32> {
        let &(r, g, b) = palette.get(index).ok_or_else(|| {
            IoError::InvalidData(format!("palette index {} out of range", index))
        })?;
        Ok(if gray_palette {
            r as u32
        } else {
            color::compose_rgb(r, g, b)
        })
    };

    // BMP rows are 4-byte aligned
    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let mut row_buffer = vec![0u8; row_stride];

    for row in 0..height {
        reader.read_exact(&mut row_buffer).map_err(IoError::Io)?;

        let y = if top_down { row } else { height - 1 - row };

        for x in 0..width {
            let val = match bits_per_pixel {
                1 => {
                    let bit = (row_buffer[(x / 8) as usize] >> (7 - (x % 8))) & 1;
                    lookup(bit as usize)?
                }
                4 => {
                    let byte = row_buffer[(x / 2) as usize];
                    let index = if x % 2 == 0 { byte >> 4 } else { byte & 0xF };
                    lookup(index as usize)?
                }
                8 => lookup(row_buffer[x as usize] as usize)?,
                _ => {
                    let bytes = (bits_per_pixel / 8) as usize;
                    let idx = x as usize * bytes;
                    color::compose_rgb(row_buffer[idx + 2], row_buffer[idx + 1], row_buffer[idx])
                }
            };
            pix_mut.set_pixel_unchecked(x, y, val);
        }
    }

    Ok(pix_mut.into())
}

/// Write a BMP image
///
/// 1 bpp is written with a black/white palette (set bit = white),
/// 8 bpp with a gray palette and 32 bpp as 24-bit BGR.
pub fn write_bmp<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();
    let depth = pix.depth();

    let bits_per_pixel: u16 = match depth {
        PixelDepth::Bit1 => 1,
        PixelDepth::Bit8 => 8,
        PixelDepth::Bit32 => 24,
    };
    let num_colors = if bits_per_pixel <= 8 {
        1usize << bits_per_pixel
    } else {
        0
    };

    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let pixel_data_size = row_stride * height as usize;
    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize + num_colors * 4;
    let file_size = pixel_offset + pixel_data_size;

    let mut header = Vec::with_capacity(pixel_offset);
    header.extend_from_slice(b"BM");
    header.extend_from_slice(&(file_size as u32).to_le_bytes());
    header.extend_from_slice(&[0u8; 4]); // Reserved
    header.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

    header.extend_from_slice(&BMP_INFO_HEADER_SIZE.to_le_bytes());
    header.extend_from_slice(&(width as i32).to_le_bytes());
    header.extend_from_slice(&(height as i32).to_le_bytes()); // Bottom-up
    header.extend_from_slice(&1u16.to_le_bytes()); // Planes
    header.extend_from_slice(&bits_per_pixel.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // Compression
    header.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    header.extend_from_slice(&0i32.to_le_bytes()); // X pixels per meter
    header.extend_from_slice(&0i32.to_le_bytes()); // Y pixels per meter
    header.extend_from_slice(&(num_colors as u32).to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // Important colors

    for i in 0..num_colors {
        let val = ((i * 255) / (num_colors - 1)) as u8;
        header.extend_from_slice(&[val, val, val, 0]);
    }
    writer.write_all(&header).map_err(IoError::Io)?;

    let mut row_buffer = vec![0u8; row_stride];

    for row in 0..height {
        let y = height - 1 - row;
        row_buffer.fill(0);

        match depth {
            PixelDepth::Bit1 => {
                for x in 0..width {
                    if pix.get_pixel_unchecked(x, y) != 0 {
                        row_buffer[(x / 8) as usize] |= 1 << (7 - (x % 8));
                    }
                }
            }
            PixelDepth::Bit8 => {
                for x in 0..width {
                    row_buffer[x as usize] = pix.get_pixel_unchecked(x, y) as u8;
                }
            }
            PixelDepth::Bit32 => {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    let idx = (x as usize) * 3;
                    row_buffer[idx] = b;
                    row_buffer[idx + 1] = g;
                    row_buffer[idx + 2] = r;
                }
            }
        }

        writer.write_all(&row_buffer).map_err(IoError::Io)?;
    }

    Ok(())
}
