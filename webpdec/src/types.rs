use std::fmt;
use std::ops::Deref;

use crate::error::{DecodeError, Error, Result};

/// Largest accepted width or height. Two 256x256 RGB565 frames plus decoder
/// working memory is what the panel controller can spare.
pub const MAX_DIMENSION: u32 = 256;

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Validate caller-supplied dimensions against `1..=MAX_DIMENSION`.
    ///
    /// Takes signed values so host integers can be checked before any narrowing.
    pub fn checked(width: i64, height: i64) -> Result<Self> {
        let in_range = |v: i64| (1..=i64::from(MAX_DIMENSION)).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(Error::InvalidDimensions { width, height });
        }
        // Both fit in u32 after the range check.
        Ok(Self::new(width as u32, height as u32))
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Tightly packed RGB888 samples, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    dims: Dimensions,
    data: Vec<u8>,
}

impl DecodedImage {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Wrap an RGB888 buffer; its length must be exactly `width * height * 3`.
    pub fn from_rgb(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> std::result::Result<Self, DecodeError> {
        let dims = Dimensions::new(width, height);
        if width == 0 || height == 0 {
            return Err(DecodeError::internal(format!("decoded image has empty size {dims}")));
        }
        let expected = dims
            .pixel_count()
            .checked_mul(Self::BYTES_PER_PIXEL)
            .ok_or_else(|| DecodeError::internal("decoded buffer size overflow"))?;
        if data.len() != expected {
            return Err(DecodeError::internal(format!(
                "decoded buffer holds {} bytes, {dims} RGB888 needs {expected}",
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterate `[r, g, b]` triples in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(Self::BYTES_PER_PIXEL)
            .map(|px| [px[0], px[1], px[2]])
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Row-major RGB565 framebuffer, one little-endian `u16` per pixel, no stride padding.
///
/// This is the only buffer that leaves the pipeline; dereferences to its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    dims: Dimensions,
    data: Vec<u8>,
}

impl PackedBuffer {
    pub const BYTES_PER_PIXEL: usize = 2;

    pub(crate) fn new(dims: Dimensions, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), dims.pixel_count() * Self::BYTES_PER_PIXEL);
        Self { dims, data }
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decoded 16-bit words in pixel order.
    pub fn words(&self) -> impl ExactSizeIterator<Item = u16> + '_ {
        self.data
            .chunks_exact(Self::BYTES_PER_PIXEL)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Deref for PackedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for PackedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<PackedBuffer> for Vec<u8> {
    fn from(buf: PackedBuffer) -> Self {
        buf.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_accepts_bounds() {
        assert_eq!(Dimensions::checked(1, 1), Ok(Dimensions::new(1, 1)));
        assert_eq!(Dimensions::checked(256, 256), Ok(Dimensions::new(256, 256)));
        assert_eq!(Dimensions::checked(64, 32), Ok(Dimensions::new(64, 32)));
    }

    #[test]
    fn checked_rejects_out_of_range() {
        for (w, h) in [(0, 1), (1, 0), (257, 1), (1, 257), (-1, 10), (10, i64::MAX)] {
            assert_eq!(
                Dimensions::checked(w, h),
                Err(Error::InvalidDimensions {
                    width: w,
                    height: h
                })
            );
        }
    }

    #[test]
    fn decoded_image_rejects_wrong_length() {
        let err = DecodedImage::from_rgb(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(err.reason, crate::DecodeErrorKind::InternalDecodeFailure);
        assert!(DecodedImage::from_rgb(0, 2, Vec::new()).is_err());
        assert!(DecodedImage::from_rgb(2, 2, vec![0; 12]).is_ok());
    }

    #[test]
    fn pixels_are_row_major_triples() {
        let img = DecodedImage::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let px: Vec<_> = img.pixels().collect();
        assert_eq!(px, vec![[1, 2, 3], [4, 5, 6]]);
    }
}
