//! Android camera preview buffers (NV21: a full Y plane followed by an
//! interleaved V/U plane at half resolution).

use crate::frame::{Frame, FrameError, PixelLayout};

// BT.601 limited-range coefficients in 20-bit fixed point
const SHIFT: i32 = 20;
const HALF: i32 = 1 << (SHIFT - 1);
const CY: i32 = 1_220_542;
const CUB: i32 = 2_116_026;
const CUG: i32 = -409_993;
const CVG: i32 = -852_492;
const CVR: i32 = 1_673_527;

fn nv21_len(width: usize, height: usize) -> usize {
    width * height + 2 * width.div_ceil(2) * height.div_ceil(2)
}

fn clip(v: i32) -> u8 {
    (v >> SHIFT).clamp(0, 255) as u8
}

/// Convert an NV21 buffer of `width`x`height` pixels into a BGRA frame.
pub fn nv21_to_bgra(bytes: &[u8], width: u32, height: u32) -> Result<Frame, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::Empty { width, height });
    }
    let (w, h) = (width as usize, height as usize);
    let expected = nv21_len(w, h);
    if bytes.len() != expected {
        return Err(FrameError::Nv21Length {
            width,
            height,
            expected,
            actual: bytes.len(),
        });
    }

    let (luma, chroma) = bytes.split_at(w * h);
    let chroma_stride = 2 * w.div_ceil(2);
    let mut bgra = Vec::with_capacity(w * h * 4);
    for y in 0..h {
        let vu_row = &chroma[(y / 2) * chroma_stride..];
        for x in 0..w {
            let yy = (luma[y * w + x] as i32 - 16).max(0) * CY;
            let v = vu_row[(x / 2) * 2] as i32 - 128;
            let u = vu_row[(x / 2) * 2 + 1] as i32 - 128;

            let r = clip(yy + HALF + CVR * v);
            let g = clip(yy + HALF + CVG * v + CUG * u);
            let b = clip(yy + HALF + CUB * u);
            bgra.extend_from_slice(&[b, g, r, 255]);
        }
    }
    Frame::new(width, height, PixelLayout::Bgra, bgra)
}
