//! RIFF/WebP container walking.
//!
//! Everything that can be decided from headers alone is decided here, so that
//! truncation, bad magic and unsupported features are reported precisely
//! before any pixel work starts.

use log::trace;

use crate::error::DecodeError;
use crate::types::Dimensions;

const RIFF_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
/// Smallest input that can hold the RIFF header and one chunk header.
pub const MIN_HEADER_SIZE: usize = RIFF_HEADER_SIZE + CHUNK_HEADER_SIZE;

const VP8_FRAME_HEADER_SIZE: usize = 10;
const VP8_START_CODE: [u8; 3] = [0x9d, 0x01, 0x2a];
const VP8L_HEADER_SIZE: usize = 5;
const VP8L_SIGNATURE: u8 = 0x2f;
const VP8X_CHUNK_SIZE: usize = 10;

const VP8X_ICC_FLAG: u8 = 0x20;
const VP8X_ALPHA_FLAG: u8 = 0x10;
const VP8X_EXIF_FLAG: u8 = 0x08;
const VP8X_XMP_FLAG: u8 = 0x04;
const VP8X_ANIMATION_FLAG: u8 = 0x02;

/// Compression used by the image chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamFormat {
    /// `VP8 ` key frame.
    Lossy,
    /// `VP8L`.
    Lossless,
}

impl BitstreamFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BitstreamFormat::Lossy => "lossy (VP8)",
            BitstreamFormat::Lossless => "lossless (VP8L)",
        }
    }
}

/// Header-level facts about a still WebP image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: BitstreamFormat,
    /// Wrapped in a `VP8X` extended container.
    pub extended: bool,
    pub has_alpha: bool,
    pub has_icc: bool,
    pub has_exif: bool,
    pub has_xmp: bool,
}

impl ImageInfo {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    fn simple(format: BitstreamFormat, (width, height): (u32, u32), has_alpha: bool) -> Self {
        Self {
            width,
            height,
            format,
            extended: false,
            has_alpha,
            has_icc: false,
            has_exif: false,
            has_xmp: false,
        }
    }
}

struct Chunk<'a> {
    fourcc: [u8; 4],
    payload: &'a [u8],
}

/// Iterator over the chunks of a RIFF payload. Stops after the first error.
struct Chunks<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.rest);
        if rest.len() < CHUNK_HEADER_SIZE {
            return Some(Err(DecodeError::truncated(format!(
                "partial chunk header ({} of {CHUNK_HEADER_SIZE} bytes)",
                rest.len()
            ))));
        }
        let fourcc = fourcc(&rest[..4]);
        let size = le_u32(&rest[4..8]) as usize;
        let body = &rest[CHUNK_HEADER_SIZE..];
        if size > body.len() {
            return Some(Err(DecodeError::truncated(format!(
                "chunk {} declares {size} bytes, {} remain",
                fourcc_str(&fourcc),
                body.len()
            ))));
        }
        trace!("chunk {} ({size} bytes)", fourcc_str(&fourcc));
        // Payloads are padded to even length; a missing final pad byte is tolerated.
        let padded = (size + (size & 1)).min(body.len());
        self.rest = &body[padded..];
        Some(Ok(Chunk {
            fourcc,
            payload: &body[..size],
        }))
    }
}

/// Parse the container and image chunk header without reconstructing pixels.
pub fn probe(data: &[u8]) -> Result<ImageInfo, DecodeError> {
    let mut chunks = Chunks {
        rest: riff_payload(data)?,
    };
    let first = match chunks.next() {
        Some(chunk) => chunk?,
        None => return Err(DecodeError::truncated("RIFF payload holds no chunks")),
    };

    let info = match &first.fourcc {
        b"VP8 " => {
            let dims = vp8_dimensions(first.payload)?;
            ImageInfo::simple(BitstreamFormat::Lossy, dims, false)
        }
        b"VP8L" => {
            let (dims, alpha) = vp8l_header(first.payload)?;
            ImageInfo::simple(BitstreamFormat::Lossless, dims, alpha)
        }
        b"VP8X" => extended(first.payload, chunks)?,
        other => {
            return Err(DecodeError::malformed(format!(
                "unexpected first chunk {}",
                fourcc_str(other)
            )));
        }
    };
    if info.width == 0 || info.height == 0 {
        return Err(DecodeError::malformed(format!(
            "zero-sized image {}",
            info.dimensions()
        )));
    }
    Ok(info)
}

/// Validate the RIFF header and return the chunk area it declares.
fn riff_payload(data: &[u8]) -> Result<&[u8], DecodeError> {
    if data.len() < MIN_HEADER_SIZE {
        return Err(DecodeError::truncated(format!(
            "need at least {MIN_HEADER_SIZE} header bytes, got {}",
            data.len()
        )));
    }
    if &data[..4] != b"RIFF" {
        return Err(DecodeError::malformed("missing RIFF signature"));
    }
    if &data[8..12] != b"WEBP" {
        return Err(DecodeError::malformed("RIFF form type is not WEBP"));
    }
    let riff_size = le_u32(&data[4..8]) as usize;
    if riff_size < RIFF_HEADER_SIZE {
        return Err(DecodeError::malformed(format!(
            "RIFF size {riff_size} cannot hold a chunk"
        )));
    }
    let end = riff_size
        .checked_add(CHUNK_HEADER_SIZE)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            DecodeError::truncated(format!(
                "RIFF declares {riff_size} bytes, {} present",
                data.len() - CHUNK_HEADER_SIZE
            ))
        })?;
    Ok(&data[RIFF_HEADER_SIZE..end])
}

/// Key-frame header of a lossy bitstream.
fn vp8_dimensions(payload: &[u8]) -> Result<(u32, u32), DecodeError> {
    if payload.len() < VP8_FRAME_HEADER_SIZE {
        return Err(DecodeError::truncated(format!(
            "VP8 frame header needs {VP8_FRAME_HEADER_SIZE} bytes, got {}",
            payload.len()
        )));
    }
    let tag = le_u24(&payload[..3]);
    let key_frame = tag & 1 == 0;
    let profile = (tag >> 1) & 7;
    let partition_len = (tag >> 5) as usize;
    if !key_frame {
        return Err(DecodeError::unsupported("VP8 interframe"));
    }
    if profile > 3 {
        return Err(DecodeError::unsupported(format!("VP8 profile {profile}")));
    }
    if payload[3..6] != VP8_START_CODE {
        return Err(DecodeError::malformed("bad VP8 start code"));
    }
    // Top two bits of each dimension are the upscaling hint, which decoding ignores.
    let width = u32::from(le_u16(&payload[6..8]) & 0x3fff);
    let height = u32::from(le_u16(&payload[8..10]) & 0x3fff);
    let available = payload.len() - VP8_FRAME_HEADER_SIZE;
    if partition_len > available {
        return Err(DecodeError::truncated(format!(
            "VP8 first partition declares {partition_len} bytes, {available} present"
        )));
    }
    Ok((width, height))
}

/// Lossless header: signature byte then 14+14+1+3 packed bits.
fn vp8l_header(payload: &[u8]) -> Result<((u32, u32), bool), DecodeError> {
    if payload.len() < VP8L_HEADER_SIZE {
        return Err(DecodeError::truncated(format!(
            "VP8L header needs {VP8L_HEADER_SIZE} bytes, got {}",
            payload.len()
        )));
    }
    if payload[0] != VP8L_SIGNATURE {
        return Err(DecodeError::malformed(format!(
            "bad VP8L signature {:#04x}",
            payload[0]
        )));
    }
    let bits = le_u32(&payload[1..5]);
    let width = (bits & 0x3fff) + 1;
    let height = ((bits >> 14) & 0x3fff) + 1;
    let alpha = (bits >> 28) & 1 == 1;
    let version = bits >> 29;
    if version != 0 {
        return Err(DecodeError::unsupported(format!("VP8L version {version}")));
    }
    Ok(((width, height), alpha))
}

fn extended(vp8x: &[u8], chunks: Chunks<'_>) -> Result<ImageInfo, DecodeError> {
    if vp8x.len() < VP8X_CHUNK_SIZE {
        return Err(DecodeError::truncated(format!(
            "VP8X chunk needs {VP8X_CHUNK_SIZE} bytes, got {}",
            vp8x.len()
        )));
    }
    let flags = vp8x[0];
    if flags & VP8X_ANIMATION_FLAG != 0 {
        return Err(DecodeError::unsupported("animated WebP"));
    }
    let canvas = Dimensions::new(le_u24(&vp8x[4..7]) + 1, le_u24(&vp8x[7..10]) + 1);
    let mut has_alpha = flags & VP8X_ALPHA_FLAG != 0;

    let mut image = None;
    for chunk in chunks {
        let chunk = chunk?;
        match &chunk.fourcc {
            b"ANIM" | b"ANMF" => return Err(DecodeError::unsupported("animated WebP")),
            b"ALPH" => has_alpha = true,
            b"VP8 " => {
                image = Some((BitstreamFormat::Lossy, vp8_dimensions(chunk.payload)?));
                break;
            }
            b"VP8L" => {
                let (dims, alpha) = vp8l_header(chunk.payload)?;
                has_alpha |= alpha;
                image = Some((BitstreamFormat::Lossless, dims));
                break;
            }
            other => trace!("skipping {} chunk", fourcc_str(other)),
        }
    }
    let Some((format, (width, height))) = image else {
        return Err(DecodeError::malformed("VP8X container has no image chunk"));
    };
    let dims = Dimensions::new(width, height);
    if dims != canvas {
        return Err(DecodeError::malformed(format!(
            "canvas is {canvas} but image chunk is {dims}"
        )));
    }
    Ok(ImageInfo {
        width,
        height,
        format,
        extended: true,
        has_alpha,
        has_icc: flags & VP8X_ICC_FLAG != 0,
        has_exif: flags & VP8X_EXIF_FLAG != 0,
        has_xmp: flags & VP8X_XMP_FLAG != 0,
    })
}

fn fourcc(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

fn fourcc_str(fourcc: &[u8; 4]) -> String {
    fourcc.escape_ascii().to_string()
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn le_u24(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
