use std::fmt;

use thiserror::Error;

use crate::types::{Dimensions, MAX_DIMENSION};

/// Why a bitstream could not be turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// Bad magic, unknown chunk layout or inconsistent header fields.
    MalformedHeader,
    /// The input ends before the header or a declared chunk does.
    TruncatedData,
    /// Well-formed, but uses something this decoder refuses (animation, interframes).
    UnsupportedFeature,
    /// The pixel engine rejected the bitstream or returned inconsistent output.
    InternalDecodeFailure,
}

impl DecodeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorKind::MalformedHeader => "malformed header",
            DecodeErrorKind::TruncatedData => "truncated data",
            DecodeErrorKind::UnsupportedFeature => "unsupported feature",
            DecodeErrorKind::InternalDecodeFailure => "internal decode failure",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of the decoder stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {detail}")]
pub struct DecodeError {
    pub reason: DecodeErrorKind,
    /// Human-readable detail naming the offending field or chunk.
    pub detail: String,
}

impl DecodeError {
    pub fn new(reason: DecodeErrorKind, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MalformedHeader, detail)
    }

    pub(crate) fn truncated(detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::TruncatedData, detail)
    }

    pub(crate) fn unsupported(detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::UnsupportedFeature, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InternalDecodeFailure, detail)
    }
}

/// The decoded image is not the size the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("decoded image is {actual}, expected {expected}")]
pub struct DimensionMismatchError {
    pub expected: Dimensions,
    pub actual: Dimensions,
}

/// Every way a call into this crate can fail.
///
/// None of these are retried or papered over: a failed call never yields pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid dimensions {width}x{height}: each side must be within 1..={max}", max = MAX_DIMENSION)]
    InvalidDimensions { width: i64, height: i64 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatchError),

    #[error("cannot allocate {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn alloc(requested: usize) -> Self {
        Error::OutOfMemory { requested }
    }

    /// Decoder reason, if this is a decode failure.
    pub fn decode_reason(&self) -> Option<DecodeErrorKind> {
        match self {
            Error::Decode(err) => Some(err.reason),
            _ => None,
        }
    }
}

/// Reserve exactly `len` bytes up front, failing instead of aborting on exhaustion.
pub(crate) fn try_alloc(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::alloc(len))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_carries_reason_and_detail() {
        let err = DecodeError::truncated("need 20 bytes, got 3");
        assert_eq!(err.to_string(), "truncated data: need 20 bytes, got 3");
    }

    #[test]
    fn mismatch_display_names_both_sizes() {
        let err = Error::from(DimensionMismatchError {
            expected: Dimensions::new(20, 20),
            actual: Dimensions::new(10, 10),
        });
        assert_eq!(err.to_string(), "decoded image is 10x10, expected 20x20");
    }

    #[test]
    fn invalid_dimensions_mentions_cap() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 300,
        };
        assert_eq!(
            err.to_string(),
            "invalid dimensions 0x300: each side must be within 1..=256"
        );
    }

    #[test]
    fn decode_reason_only_for_decode_errors() {
        let err = Error::from(DecodeError::unsupported("animation"));
        assert_eq!(
            err.decode_reason(),
            Some(DecodeErrorKind::UnsupportedFeature)
        );
        assert_eq!(Error::alloc(8).decode_reason(), None);
    }
}
