//! Decode WebP stills into packed RGB565 framebuffers for HUB75-style RGB
//! matrix panels.
//!
//! The crate is a straight pipeline with no global state:
//! - [`Decoder`] validates the RIFF/WebP container itself (reporting truncation,
//!   bad magic and unsupported features precisely) and hands pixel
//!   reconstruction to a [`PixelEngine`], libwebp by default.
//! - [`pack`] truncates RGB888 to RGB565 and writes little-endian words.
//! - [`Pipeline`] checks the requested size, decodes, cross-checks and packs.
//!
//! [`decode_image`] is the single entry point meant for host bindings; see the
//! `webpdec-ffi` crate for a C ABI over it and `webpdec-cli` for a host tool.

mod container;
mod decoder;
mod engine;
mod error;
mod packer;
mod pipeline;
mod types;

pub use container::{BitstreamFormat, ImageInfo, MIN_HEADER_SIZE};
pub use decoder::{Decoder, decode, probe};
pub use engine::{LibWebp, PixelEngine};
pub use error::{DecodeError, DecodeErrorKind, DimensionMismatchError, Error, Result};
pub use packer::{pack, rgb565};
pub use pipeline::{Pipeline, Stage};
pub use types::*;

/// Semantic version of this crate, tagged with the pixel engine.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-libwebp");

pub fn version() -> &'static str {
    VERSION
}

/// Decode `data` to exactly `width * height * 2` bytes of little-endian RGB565.
///
/// Takes host-sized signed integers; anything outside `1..=MAX_DIMENSION` is
/// [`Error::InvalidDimensions`] and the input is never read.
pub fn decode_image(data: &[u8], width: i64, height: i64) -> Result<Vec<u8>> {
    let dims = Dimensions::checked(width, height)?;
    Pipeline::new()
        .process(data, dims.width, dims.height)
        .map(PackedBuffer::into_vec)
}
