// High-level one-shot API: allocate, compress, decompress.
//
// Thin convenience over the codec entry points for callers that want owned
// buffers instead of managing destination slices themselves.

use crate::codec::{self, CompressError, DecompressError};
use crate::hash::config::Params;

/// Compress `input` into a freshly allocated buffer.
pub fn compress_to_vec(input: &[u8]) -> Result<Vec<u8>, CompressError> {
    compress_to_vec_with_params(input, &Params::DEFAULT)
}

/// Compress with explicit parameters into a freshly allocated buffer.
pub fn compress_to_vec_with_params(
    input: &[u8],
    params: &Params,
) -> Result<Vec<u8>, CompressError> {
    let mut dst = vec![0u8; codec::compress_bound(input.len())];
    let written = codec::compress_with_params(input, &mut dst, params)?;
    dst.truncate(written);
    Ok(dst)
}

/// Decompress `src` into a freshly allocated buffer of `capacity` bytes,
/// truncated to the decoded length.
pub fn decompress_to_vec(src: &[u8], capacity: usize) -> Result<Vec<u8>, DecompressError> {
    decompress_to_vec_with_params(src, capacity, &Params::DEFAULT)
}

/// Decompress with explicit parameters (only `min_match` is consulted).
pub fn decompress_to_vec_with_params(
    src: &[u8],
    capacity: usize,
    params: &Params,
) -> Result<Vec<u8>, DecompressError> {
    let mut dst = vec![0u8; capacity];
    let written = codec::decompress_with_params(src, &mut dst, params)?;
    dst.truncate(written);
    Ok(dst)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
