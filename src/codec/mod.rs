// Block codec: compressor driver, emit format, decoder, container header.
//
// The wire format is a sequence of blocks, each:
//
//   token | literal-length ext | literals | offset (4 B LE) | match-length ext
//
// terminated by a trailing literal-only run (token + extension + literals,
// nothing after). The token's high nibble is the literal length and its low
// nibble the match length, both capped at 15 with 0xFF-run extensions.
// Match lengths are stored minus the minimum match length.

pub mod decoder;
pub mod encoder;
pub mod header;

/// Bits of the token used for the match-length nibble.
pub const ML_BITS: u32 = 4;

/// Maximum value of the match-length nibble.
pub const ML_MASK: u8 = (1 << ML_BITS) - 1;

/// Maximum value of the literal-length nibble.
pub const RUN_MASK: u8 = (1 << (8 - ML_BITS)) - 1;

/// Size of the little-endian match offset on the wire.
pub const OFFSET_SIZE: usize = 4;

// Re-export the codec surface.
pub use decoder::{Block, BlockIter, DecompressError, decompress, decompress_with_params};
pub use encoder::{
    CompressError, CompressStats, compress, compress_bound, compress_with_params,
    compress_with_stats,
};
pub use header::{FrameHeader, HEADER_SIZE};
