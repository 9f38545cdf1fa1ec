//! C ABI over [`webpdec`] for firmware modules.
//!
//! Every entry point returns either a non-negative byte count or one of the
//! negative `WEBPDEC_E*` codes below; no error kind shares a code. See
//! `include/webpdec.h` for the matching declarations.

use std::ffi::{CStr, c_char};
use std::{ptr, slice};

use log::warn;
use webpdec::{DecodeErrorKind, Error};

pub const WEBPDEC_EINVALID_DIMENSIONS: i32 = -1;
pub const WEBPDEC_EMALFORMED: i32 = -2;
pub const WEBPDEC_ETRUNCATED: i32 = -3;
pub const WEBPDEC_EUNSUPPORTED: i32 = -4;
pub const WEBPDEC_EINTERNAL: i32 = -5;
pub const WEBPDEC_EDIMENSION_MISMATCH: i32 = -6;
pub const WEBPDEC_ENOMEM: i32 = -7;
pub const WEBPDEC_EBUFFER_TOO_SMALL: i32 = -8;
pub const WEBPDEC_ENULL: i32 = -9;

const VERSION: &CStr = {
    const BYTES: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "-libwebp\0").as_bytes();
    match CStr::from_bytes_with_nul(BYTES) {
        Ok(s) => s,
        Err(_) => panic!("version string contains a NUL"),
    }
};

/// Stable code for `err`.
pub fn error_code(err: &Error) -> i32 {
    match err {
        Error::InvalidDimensions { .. } => WEBPDEC_EINVALID_DIMENSIONS,
        Error::Decode(e) => match e.reason {
            DecodeErrorKind::MalformedHeader => WEBPDEC_EMALFORMED,
            DecodeErrorKind::TruncatedData => WEBPDEC_ETRUNCATED,
            DecodeErrorKind::UnsupportedFeature => WEBPDEC_EUNSUPPORTED,
            DecodeErrorKind::InternalDecodeFailure => WEBPDEC_EINTERNAL,
        },
        Error::DimensionMismatch(_) => WEBPDEC_EDIMENSION_MISMATCH,
        Error::OutOfMemory { .. } => WEBPDEC_ENOMEM,
    }
}

fn fail(err: Error) -> i32 {
    warn!("webpdec: {err}");
    error_code(&err)
}

/// Builds the input slice, treating a null pointer with zero length as empty.
///
/// # Safety
///
/// `input` must be null or point to `input_len` readable bytes.
unsafe fn input_slice<'a>(input: *const u8, input_len: usize) -> Option<&'a [u8]> {
    if input.is_null() {
        return (input_len == 0).then_some(&[][..]);
    }
    Some(unsafe { slice::from_raw_parts(input, input_len) })
}

/// Decodes a WebP image into a caller-provided RGB565 (little-endian) buffer.
///
/// - `input`: Pointer to the WebP file bytes
/// - `input_len`: Length of the input, in bytes
/// - `width`, `height`: Size the image must have, each in `1..=256`
/// - `output`: Pointer to the output buffer
/// - `output_len`: Length of the output buffer, in bytes
///
/// Returns the number of bytes written (`width * height * 2`) or a negative
/// `WEBPDEC_E*` code. On failure `output` is left untouched.
///
/// # Safety
///
/// `input` must point to `input_len` readable bytes and `output` to
/// `output_len` writable bytes. Neither may be mutated by another thread during
/// the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webpdec_decode(
    input: *const u8,
    input_len: usize,
    width: i32,
    height: i32,
    output: *mut u8,
    output_len: usize,
) -> i32 {
    let Some(input) = (unsafe { input_slice(input, input_len) }) else {
        return WEBPDEC_ENULL;
    };
    if output.is_null() {
        return WEBPDEC_ENULL;
    }

    let packed = match webpdec::decode_image(input, i64::from(width), i64::from(height)) {
        Ok(packed) => packed,
        Err(err) => return fail(err),
    };
    if packed.len() > output_len {
        warn!(
            "webpdec: output buffer holds {output_len} bytes, {} needed",
            packed.len()
        );
        return WEBPDEC_EBUFFER_TOO_SMALL;
    }

    let output = unsafe { slice::from_raw_parts_mut(output, output_len) };
    output[..packed.len()].copy_from_slice(&packed);
    // At most 256 * 256 * 2 bytes.
    packed.len() as i32
}

/// Decodes a WebP image into a newly allocated RGB565 (little-endian) buffer.
///
/// On success `*output` receives the buffer and the byte count is returned;
/// release the buffer with [`webpdec_free`] passing that same length. On
/// failure `*output` is set to null and a negative `WEBPDEC_E*` code is
/// returned.
///
/// # Safety
///
/// `input` must point to `input_len` readable bytes and `output` must be a
/// valid pointer to writable storage for one pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webpdec_decode_alloc(
    input: *const u8,
    input_len: usize,
    width: i32,
    height: i32,
    output: *mut *mut u8,
) -> i32 {
    if output.is_null() {
        return WEBPDEC_ENULL;
    }
    unsafe { output.write(ptr::null_mut()) };
    let Some(input) = (unsafe { input_slice(input, input_len) }) else {
        return WEBPDEC_ENULL;
    };

    match webpdec::decode_image(input, i64::from(width), i64::from(height)) {
        Ok(packed) => {
            let packed = packed.into_boxed_slice();
            let len = packed.len() as i32;
            unsafe { output.write(Box::into_raw(packed).cast::<u8>()) };
            len
        }
        Err(err) => fail(err),
    }
}

/// Releases a buffer returned by [`webpdec_decode_alloc`]. Null is a no-op.
///
/// # Safety
///
/// `buf` must be null or a pointer produced by `webpdec_decode_alloc` whose
/// returned length was `len`, and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webpdec_free(buf: *mut u8, len: usize) {
    if buf.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(buf, len)) });
}

/// Static, NUL-terminated description of a return code.
#[unsafe(no_mangle)]
pub extern "C" fn webpdec_error_message(code: i32) -> *const c_char {
    let msg: &'static CStr = match code {
        0.. => c"ok",
        WEBPDEC_EINVALID_DIMENSIONS => c"invalid dimensions",
        WEBPDEC_EMALFORMED => c"malformed header",
        WEBPDEC_ETRUNCATED => c"truncated data",
        WEBPDEC_EUNSUPPORTED => c"unsupported feature",
        WEBPDEC_EINTERNAL => c"internal decode failure",
        WEBPDEC_EDIMENSION_MISMATCH => c"dimension mismatch",
        WEBPDEC_ENOMEM => c"out of memory",
        WEBPDEC_EBUFFER_TOO_SMALL => c"output buffer too small",
        WEBPDEC_ENULL => c"null pointer",
        _ => c"unknown error",
    };
    msg.as_ptr()
}

/// Static, NUL-terminated version string, e.g. `0.1.0-libwebp`.
#[unsafe(no_mangle)]
pub extern "C" fn webpdec_version() -> *const c_char {
    VERSION.as_ptr()
}
