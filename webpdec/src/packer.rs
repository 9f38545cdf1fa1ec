use crate::error::{DimensionMismatchError, Result, try_alloc};
use crate::types::{DecodedImage, Dimensions, PackedBuffer};

/// Truncate an RGB888 sample to 5-6-5 bits, red in the high bits.
#[inline]
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xf8) as u16) << 8) | (((g & 0xfc) as u16) << 3) | (b >> 3) as u16
}

/// Pack `decoded` into a little-endian RGB565 framebuffer of `expected` size.
///
/// A size mismatch fails before anything is allocated. The decoded image is
/// borrowed so the caller decides when to release it.
pub fn pack(decoded: &DecodedImage, expected: Dimensions) -> Result<PackedBuffer> {
    let actual = decoded.dimensions();
    if actual != expected {
        return Err(DimensionMismatchError { expected, actual }.into());
    }

    let len = expected.pixel_count() * PackedBuffer::BYTES_PER_PIXEL;
    let mut out = try_alloc(len)?;
    out.resize(len, 0);
    convert(decoded.as_bytes(), &mut out);
    Ok(PackedBuffer::new(expected, out))
}

#[cfg(not(feature = "rayon"))]
fn convert(rgb: &[u8], out: &mut [u8]) {
    for (src, dst) in rgb.chunks_exact(3).zip(out.chunks_exact_mut(2)) {
        dst.copy_from_slice(&rgb565(src[0], src[1], src[2]).to_le_bytes());
    }
}

#[cfg(feature = "rayon")]
fn convert(rgb: &[u8], out: &mut [u8]) {
    use rayon::prelude::*;

    out.par_chunks_exact_mut(2)
        .zip(rgb.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            dst.copy_from_slice(&rgb565(src[0], src[1], src[2]).to_le_bytes());
        });
}
