use log::debug;

use crate::container::ImageInfo;
use crate::error::{DecodeError, Result, try_alloc};
use crate::types::DecodedImage;

/// Pixel reconstruction backend.
///
/// Called only after the container has been validated; `info` holds the parsed
/// header. Implementations must return RGB888 for exactly `info`'s dimensions
/// or fail, and must not keep `data` past the call.
pub trait PixelEngine {
    fn name(&self) -> &'static str;

    fn reconstruct(&self, data: &[u8], info: &ImageInfo) -> Result<DecodedImage>;
}

/// libwebp, through the `webp` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibWebp;

impl PixelEngine for LibWebp {
    fn name(&self) -> &'static str {
        "libwebp"
    }

    fn reconstruct(&self, data: &[u8], info: &ImageInfo) -> Result<DecodedImage> {
        let image = webp::Decoder::new(data)
            .decode()
            .ok_or_else(|| DecodeError::internal("libwebp rejected the bitstream"))?;
        if (image.width(), image.height()) != (info.width, info.height) {
            return Err(DecodeError::internal(format!(
                "libwebp produced {}x{}, header says {}",
                image.width(),
                image.height(),
                info.dimensions()
            ))
            .into());
        }

        let channels = if image.is_alpha() { 4 } else { 3 };
        let expected = info.dimensions().pixel_count() * channels;
        if image.len() != expected {
            return Err(DecodeError::internal(format!(
                "libwebp returned {} bytes, expected {expected}",
                image.len()
            ))
            .into());
        }
        debug!("libwebp decoded {} ({channels} channels)", info.dimensions());

        let rgb = to_rgb888(&image, channels)?;
        Ok(DecodedImage::from_rgb(info.width, info.height, rgb)?)
    }
}

/// Copy engine output into an owned RGB888 buffer, dropping alpha if present.
pub(crate) fn to_rgb888(samples: &[u8], channels: usize) -> Result<Vec<u8>> {
    let pixels = samples.len() / channels;
    let mut rgb = try_alloc(pixels * DecodedImage::BYTES_PER_PIXEL)?;
    for px in samples.chunks_exact(channels) {
        rgb.extend_from_slice(&px[..DecodedImage::BYTES_PER_PIXEL]);
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_dropped() {
        let rgba = [1, 2, 3, 255, 4, 5, 6, 0];
        assert_eq!(to_rgb888(&rgba, 4).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn rgb_is_copied_verbatim() {
        let rgb = [9, 8, 7, 6, 5, 4];
        assert_eq!(to_rgb888(&rgb, 3).unwrap(), rgb.to_vec());
    }
}
