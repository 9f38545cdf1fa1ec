use std::fmt;

use log::{debug, warn};

use crate::decoder::Decoder;
use crate::engine::{LibWebp, PixelEngine};
use crate::error::{DimensionMismatchError, Error, Result};
use crate::packer;
use crate::types::{Dimensions, PackedBuffer};

/// Steps of a single `process` call, in order. A failure in any step ends the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateDimensions,
    Decode,
    CheckDimensions,
    Pack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ValidateDimensions => "validate dimensions",
            Stage::Decode => "decode",
            Stage::CheckDimensions => "check dimensions",
            Stage::Pack => "pack",
        })
    }
}

/// Validate, decode, cross-check and pack in one call.
#[derive(Debug, Clone, Default)]
pub struct Pipeline<E = LibWebp> {
    decoder: Decoder<E>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            decoder: Decoder::new(),
        }
    }
}

impl<E: PixelEngine> Pipeline<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            decoder: Decoder::with_engine(engine),
        }
    }

    pub fn decoder(&self) -> &Decoder<E> {
        &self.decoder
    }

    /// Decode `data` into an RGB565 framebuffer of exactly `width` x `height`.
    ///
    /// The dimensions are checked before `data` is looked at, and the header's
    /// size is compared with them before any pixel memory is allocated. The
    /// intermediate RGB888 image is released before this returns.
    pub fn process(&self, data: &[u8], width: u32, height: u32) -> Result<PackedBuffer> {
        let expected = Dimensions::checked(i64::from(width), i64::from(height))
            .map_err(|e| failed(Stage::ValidateDimensions, e))?;

        let info = self
            .decoder
            .probe(data)
            .map_err(|e| failed(Stage::Decode, e))?;
        if info.dimensions() != expected {
            let mismatch = DimensionMismatchError {
                expected,
                actual: info.dimensions(),
            };
            return Err(failed(Stage::CheckDimensions, mismatch.into()));
        }

        let decoded = self
            .decoder
            .reconstruct(data, &info)
            .map_err(|e| failed(Stage::Decode, e))?;

        let packed = packer::pack(&decoded, expected);
        drop(decoded);
        let packed = packed.map_err(|e| {
            let stage = match e {
                Error::DimensionMismatch(_) => Stage::CheckDimensions,
                _ => Stage::Pack,
            };
            failed(stage, e)
        })?;

        debug!("packed {} into {} bytes", expected, packed.len());
        Ok(packed)
    }
}

fn failed(stage: Stage, err: Error) -> Error {
    warn!("{stage} failed: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ImageInfo;
    use crate::types::DecodedImage;

    struct PanicEngine;

    impl PixelEngine for PanicEngine {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn reconstruct(&self, _: &[u8], _: &ImageInfo) -> Result<DecodedImage> {
            panic!("engine must not run");
        }
    }

    #[test]
    fn invalid_dimensions_never_reach_the_decoder() {
        let pipeline = Pipeline::with_engine(PanicEngine);
        for (w, h) in [(0, 10), (10, 0), (257, 10), (10, 257), (u32::MAX, 1)] {
            assert_eq!(
                pipeline.process(&[], w, h),
                Err(Error::InvalidDimensions {
                    width: i64::from(w),
                    height: i64::from(h),
                })
            );
        }
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::CheckDimensions.to_string(), "check dimensions");
        assert_eq!(Stage::ValidateDimensions.to_string(), "validate dimensions");
    }
}
