use log::debug;

use crate::container::{self, ImageInfo};
use crate::engine::{LibWebp, PixelEngine};
use crate::error::{DecodeError, Result};
use crate::types::DecodedImage;

/// Turns a WebP byte span into RGB888 samples.
///
/// Stateless apart from the engine; one decoder can serve any number of calls,
/// from any number of threads if the engine allows it.
#[derive(Debug, Clone, Default)]
pub struct Decoder<E = LibWebp> {
    engine: E,
}

impl Decoder {
    pub fn new() -> Self {
        Self { engine: LibWebp }
    }
}

impl<E: PixelEngine> Decoder<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Read the container headers only.
    pub fn probe(&self, data: &[u8]) -> Result<ImageInfo> {
        Ok(container::probe(data)?)
    }

    /// Fully decode `data`. On failure nothing is allocated for the caller.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage> {
        let info = container::probe(data)?;
        self.reconstruct(data, &info)
    }

    /// Reconstruct pixels for a container already accepted by [`Decoder::probe`].
    pub fn reconstruct(&self, data: &[u8], info: &ImageInfo) -> Result<DecodedImage> {
        debug!(
            "{} {} image, alpha={}, extended={}",
            info.dimensions(),
            info.format.as_str(),
            info.has_alpha,
            info.extended
        );

        let image = self.engine.reconstruct(data, info)?;
        if image.dimensions() != info.dimensions() {
            return Err(DecodeError::internal(format!(
                "{} engine produced {}, header says {}",
                self.engine.name(),
                image.dimensions(),
                info.dimensions()
            ))
            .into());
        }
        Ok(image)
    }
}

/// Decode with the default engine.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    Decoder::new().decode(data)
}

/// Read the container headers without decoding pixels.
pub fn probe(data: &[u8]) -> Result<ImageInfo> {
    Ok(container::probe(data)?)
}
