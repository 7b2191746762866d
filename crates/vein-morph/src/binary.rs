//! Binary morphological operations
//!
//! Erosion, dilation, opening and closing for 1 bpp images. Each hit of
//! the structuring element contributes one shifted copy of every source
//! row, OR-ed (dilation) or AND-ed (erosion) into the destination at
//! 32-bit word granularity.
//!
//! # Boundary conditions
//!
//! Pixels outside the image are background for dilation and foreground
//! for erosion, so neither operation creates or removes foreground just
//! because it is near the border. Opening and closing inherit this.

use crate::{MorphError, MorphResult, Sel};
use vein_core::{Pix, PixMut, PixelDepth};

/// Dilate a binary image.
///
/// `dst(x, y) = OR over hits (dx, dy) of src(x - dx, y - dy)`
pub fn dilate(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    check_binary(pix)?;
    let out = rasterop(pix, sel, Accumulate::Or)?;
    Ok(out.into())
}

/// Erode a binary image.
///
/// `dst(x, y) = AND over hits (dx, dy) of src(x + dx, y + dy)`
pub fn erode(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    check_binary(pix)?;
    let out = rasterop(pix, sel, Accumulate::And)?;
    Ok(out.into())
}

/// Open a binary image
///
/// Opening = Erosion followed by Dilation.
/// Removes foreground smaller than the SEL and smooths contours.
pub fn open(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    let eroded = erode(pix, sel)?;
    dilate(&eroded, sel)
}

/// Close a binary image
///
/// Closing = Dilation followed by Erosion.
/// Fills small holes and connects nearby objects.
pub fn close(pix: &Pix, sel: &Sel) -> MorphResult<Pix> {
    let dilated = dilate(pix, sel)?;
    erode(&dilated, sel)
}

/// Dilate with a `width x height` brick.
pub fn dilate_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    dilate(pix, &Sel::create_brick(width, height)?)
}

/// Erode with a `width x height` brick.
pub fn erode_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    erode(pix, &Sel::create_brick(width, height)?)
}

/// Open with a `width x height` brick.
pub fn open_brick(pix: &Pix, width: u32, height: u32) -> MorphResult<Pix> {
    open(pix, &Sel::create_brick(width, height)?)
}

/// Open with a `size x size` ellipse. A size of 1 returns a copy.
pub fn open_ellipse(pix: &Pix, size: u32) -> MorphResult<Pix> {
    open(pix, &Sel::create_ellipse(size, size)?)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Accumulate {
    Or,
    And,
}

/// Accumulate one shifted copy of the source per SEL hit.
fn rasterop(pix: &Pix, sel: &Sel, acc: Accumulate) -> MorphResult<PixMut> {
    let (w, h) = pix.dimensions();
    let wpl = pix.wpl() as usize;
    let mut out_mut = Pix::new(w, h, PixelDepth::Bit1)?.try_into_mut().unwrap();

    // Bits shifted in from outside the image
    let fill = match acc {
        Accumulate::Or => 0u32,
        Accumulate::And => !0u32,
    };
    let dst_data = out_mut.data_mut();
    if acc == Accumulate::And {
        dst_data.fill(!0);
    }

    let src_data = pix.data();
    let mut shifted = vec![0u32; wpl];
    // Dilation reads src(x - dx, y - dy), erosion src(x + dx, y + dy)
    let sign = if acc == Accumulate::Or { -1 } else { 1 };

    for (dx, dy) in sel.hit_offsets() {
        let (dx, dy) = (dx * sign, dy * sign);
        for y in 0..h as i32 {
            let src_y = y + dy;
            let dst = &mut dst_data[y as usize * wpl..(y as usize + 1) * wpl];
            // Rows outside the image are all `fill`: a no-op for both modes
            if src_y < 0 || src_y >= h as i32 {
                continue;
            }
            let src = &src_data[src_y as usize * wpl..(src_y as usize + 1) * wpl];
            shift_row(&mut shifted, src, w, -dx, fill);
            match acc {
                Accumulate::Or => dst.iter_mut().zip(&shifted).for_each(|(d, s)| *d |= s),
                Accumulate::And => dst.iter_mut().zip(&shifted).for_each(|(d, s)| *d &= s),
            }
        }
    }

    clear_unused_bits(dst_data, w, wpl);
    Ok(out_mut)
}

/// Write `src` shifted by `shift` pixels into `dst`.
///
/// Positive shifts move pixels right: `dst[x] = src[x - shift]`. Pixels
/// that come from outside `[0, width)` take the value of `fill`.
fn shift_row(dst: &mut [u32], src: &[u32], width: u32, shift: i32, fill: u32) {
    let wpl = dst.len();
    dst.fill(0);

    let abs_shift = shift.unsigned_abs() as usize;
    let word_shift = abs_shift / 32;
    let bit_shift = (abs_shift % 32) as u32;

    if word_shift < wpl {
        if shift >= 0 {
            for i in word_shift..wpl {
                let si = i - word_shift;
                let mut v = src[si] >> bit_shift;
                if bit_shift != 0 && si > 0 {
                    v |= src[si - 1] << (32 - bit_shift);
                }
                dst[i] = v;
            }
        } else {
            let end = wpl - word_shift;
            for i in 0..end {
                let si = i + word_shift;
                let mut v = src[si] << bit_shift;
                if bit_shift != 0 && si + 1 < wpl {
                    v |= src[si + 1] >> (32 - bit_shift);
                }
                dst[i] = v;
            }
        }
    }

    if fill != 0 && shift != 0 {
        let n = abs_shift.min(width as usize) as u32;
        let start = if shift > 0 { 0 } else { width - n };
        set_bit_range(dst, start, n);
    }
}

/// Set `count` bits starting at pixel `start`.
fn set_bit_range(line: &mut [u32], start: u32, count: u32) {
    for x in start..start + count {
        line[(x >> 5) as usize] |= 0x8000_0000 >> (x & 31);
    }
}

/// Zero the padding bits past `width` at the end of every row.
fn clear_unused_bits(data: &mut [u32], width: u32, wpl: usize) {
    let extra = width % 32;
    if extra == 0 {
        return;
    }
    // MSB-first: valid bits are the top `extra` bits
    let mask = !0u32 << (32 - extra);
    for row in data.chunks_exact_mut(wpl) {
        row[wpl - 1] &= mask;
    }
}

fn check_binary(pix: &Pix) -> MorphResult<()> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(MorphError::UnsupportedDepth {
            expected: "1 bpp binary",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
