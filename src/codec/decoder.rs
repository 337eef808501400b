// Block decoder.
//
// Inverts the emit format: token, literal run, 4-byte offset, match length,
// then an overlap-aware copy from earlier output. The trailing run is
// recognised structurally: the input is exhausted right after its literals.
//
// Unlike the compressor-facing format description, nothing here is trusted:
// every read and every write is bounds-checked, and malformed streams
// surface as `InvalidInput` rather than a panic or a wild copy.

use thiserror::Error;

use crate::hash::config::Params;

use super::{ML_BITS, ML_MASK, OFFSET_SIZE, RUN_MASK};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecompressError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("output buffer too small: need at least {needed} bytes, have {capacity}")]
    OutputTooSmall { needed: u64, capacity: usize },
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Accumulate a 0xFF-run length extension starting at `*ip`.
fn read_length_extension(src: &[u8], ip: &mut usize) -> Result<u64, DecompressError> {
    let mut total = 0u64;
    loop {
        let Some(&byte) = src.get(*ip) else {
            return Err(DecompressError::InvalidInput(
                "truncated length extension".into(),
            ));
        };
        *ip += 1;
        total += byte as u64;
        if byte != 0xFF {
            return Ok(total);
        }
    }
}

/// Decompress `src` into `dst` with the default parameters, returning the
/// number of bytes written.
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize, DecompressError> {
    decompress_with_params(src, dst, &Params::DEFAULT)
}

/// Decompress with explicit parameters. Only `min_match` matters to the
/// decoder; it must equal the compressor's.
pub fn decompress_with_params(
    src: &[u8],
    dst: &mut [u8],
    params: &Params,
) -> Result<usize, DecompressError> {
    let min_match = params.min_match as u64;
    let mut ip = 0usize;
    let mut op = 0usize;

    while ip < src.len() {
        let token = src[ip];
        ip += 1;

        // Literal run.
        let mut literal_length = (token >> ML_BITS) as u64;
        if literal_length == RUN_MASK as u64 {
            literal_length += read_length_extension(src, &mut ip)?;
        }
        if literal_length > (src.len() - ip) as u64 {
            return Err(DecompressError::InvalidInput(
                "literal run past end of input".into(),
            ));
        }
        let literal_length = literal_length as usize;
        if literal_length > dst.len() - op {
            return Err(DecompressError::OutputTooSmall {
                needed: (op + literal_length) as u64,
                capacity: dst.len(),
            });
        }
        dst[op..op + literal_length].copy_from_slice(&src[ip..ip + literal_length]);
        ip += literal_length;
        op += literal_length;

        // Input exhausted right after literals: that was the trailing run.
        if ip == src.len() {
            break;
        }

        // Offset.
        if src.len() - ip < OFFSET_SIZE {
            return Err(DecompressError::InvalidInput("truncated offset".into()));
        }
        let offset =
            u32::from_le_bytes([src[ip], src[ip + 1], src[ip + 2], src[ip + 3]]) as usize;
        ip += OFFSET_SIZE;
        if offset == 0 {
            return Err(DecompressError::InvalidInput("zero match offset".into()));
        }
        if offset > op {
            return Err(DecompressError::InvalidInput(format!(
                "match offset {offset} reaches before start of output ({op} bytes decoded)"
            )));
        }

        // Match length.
        let mut match_length = (token & ML_MASK) as u64;
        if match_length == ML_MASK as u64 {
            match_length += read_length_extension(src, &mut ip)?;
        }
        match_length += min_match;
        if match_length > (dst.len() - op) as u64 {
            return Err(DecompressError::OutputTooSmall {
                needed: op as u64 + match_length,
                capacity: dst.len(),
            });
        }
        let match_length = match_length as usize;

        // Copy from earlier output. When the offset is shorter than the
        // match the regions overlap and the copy must replicate bytes it
        // just wrote, so it runs byte by byte.
        if offset >= match_length {
            dst.copy_within(op - offset..op - offset + match_length, op);
        } else {
            for i in 0..match_length {
                dst[op + i] = dst[op - offset + i];
            }
        }
        op += match_length;
    }

    Ok(op)
}

// ---------------------------------------------------------------------------
// Block walker
// ---------------------------------------------------------------------------

/// One parsed block, without its literal payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Byte position of the token in the compressed stream.
    pub position: usize,
    /// Length of the literal run.
    pub literal_length: u64,
    /// Match offset; `None` for the trailing run.
    pub offset: Option<u32>,
    /// Decoded match length (bias already re-added); `None` for the
    /// trailing run.
    pub match_length: Option<u64>,
}

/// Read-only iterator over the block structure of a compressed payload.
///
/// Performs the same validation as the decoder minus the literal copies;
/// drives the CLI's `blocks` listing and structural tests.
pub struct BlockIter<'a> {
    src: &'a [u8],
    ip: usize,
    decoded: u64,
    min_match: u64,
    done: bool,
}

impl<'a> BlockIter<'a> {
    pub fn new(src: &'a [u8], params: &Params) -> Self {
        Self {
            src,
            ip: 0,
            decoded: 0,
            min_match: params.min_match as u64,
            done: false,
        }
    }

    fn next_block(&mut self) -> Result<Block, DecompressError> {
        let position = self.ip;
        let token = self.src[self.ip];
        self.ip += 1;

        let mut literal_length = (token >> ML_BITS) as u64;
        if literal_length == RUN_MASK as u64 {
            literal_length += read_length_extension(self.src, &mut self.ip)?;
        }
        if literal_length > (self.src.len() - self.ip) as u64 {
            return Err(DecompressError::InvalidInput(
                "literal run past end of input".into(),
            ));
        }
        self.ip += literal_length as usize;
        self.decoded += literal_length;

        if self.ip == self.src.len() {
            self.done = true;
            return Ok(Block {
                position,
                literal_length,
                offset: None,
                match_length: None,
            });
        }

        if self.src.len() - self.ip < OFFSET_SIZE {
            return Err(DecompressError::InvalidInput("truncated offset".into()));
        }
        let offset = u32::from_le_bytes([
            self.src[self.ip],
            self.src[self.ip + 1],
            self.src[self.ip + 2],
            self.src[self.ip + 3],
        ]);
        self.ip += OFFSET_SIZE;
        if offset == 0 {
            return Err(DecompressError::InvalidInput("zero match offset".into()));
        }
        if offset as u64 > self.decoded {
            return Err(DecompressError::InvalidInput(format!(
                "match offset {offset} reaches before start of output ({} bytes decoded)",
                self.decoded
            )));
        }

        let mut match_length = (token & ML_MASK) as u64;
        if match_length == ML_MASK as u64 {
            match_length += read_length_extension(self.src, &mut self.ip)?;
        }
        match_length += self.min_match;
        self.decoded += match_length;

        Ok(Block {
            position,
            literal_length,
            offset: Some(offset),
            match_length: Some(match_length),
        })
    }
}

impl Iterator for BlockIter<'_> {
    type Item = Result<Block, DecompressError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.ip >= self.src.len() {
            return None;
        }
        let item = self.next_block();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
