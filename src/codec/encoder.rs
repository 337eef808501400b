// Compressor driver and block emitter.
//
// The driver walks the input one byte at a time, sliding the rolling
// checksum, probing the match table at every position and inserting sampled
// positions. An accepted candidate is extended backward to the anchor,
// emitted as one block, and the rolling state is re-seeded across the
// matched region. Literals that never found a match are flushed as the
// trailing run.
//
// Every output write goes through a bounds-checked sink; the compressor
// returns `OutputTooSmall` instead of writing past the destination.

use log::debug;
use thiserror::Error;

use crate::hash::config::{Params, ParamsError};
use crate::hash::matching::{self, BestMatch};
use crate::hash::rolling::RollingHash;
use crate::hash::table::{HashEntry, MatchTable};

use super::{ML_BITS, ML_MASK, RUN_MASK};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("output buffer too small: need at least {needed} bytes, have {capacity}")]
    OutputTooSmall { needed: usize, capacity: usize },
    #[error("input of {len} bytes exceeds the 4 GiB addressing limit")]
    SourceTooLarge { len: usize },
    #[error(transparent)]
    Params(#[from] ParamsError),
}

// ---------------------------------------------------------------------------
// Worst-case output size
// ---------------------------------------------------------------------------

/// Size a destination buffer must have so that `compress` cannot fail with
/// `OutputTooSmall`: the input plus one extension byte per 255 literals
/// plus fixed token/offset slack.
pub const fn compress_bound(src_len: usize) -> usize {
    src_len + src_len / 255 + 16
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Per-call emission counters. Observations only; nothing here reaches the
/// compressed stream.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Number of match blocks emitted.
    pub num_matches: u64,
    /// Total matched bytes (match lengths before the minimum-match bias is
    /// subtracted for the wire).
    pub total_match_length: u64,
    /// Total literal bytes, including the trailing run.
    pub total_literal_length: u64,
    /// Sum of all match offsets.
    pub total_offset: u64,
    /// Smallest offset emitted (`u32::MAX` when no match was emitted).
    pub min_offset: u32,
    /// Largest offset emitted.
    pub max_offset: u32,
    /// Match counts bucketed by `floor(log2(offset))`.
    pub offset_histogram: [u32; 32],
}

impl Default for CompressStats {
    fn default() -> Self {
        Self {
            num_matches: 0,
            total_match_length: 0,
            total_literal_length: 0,
            total_offset: 0,
            min_offset: u32::MAX,
            max_offset: 0,
            offset_histogram: [0; 32],
        }
    }
}

impl CompressStats {
    fn record_match(&mut self, literal_length: u64, offset: u32, match_length: u64) {
        self.num_matches += 1;
        self.total_match_length += match_length;
        self.total_literal_length += literal_length;
        self.total_offset += offset as u64;
        self.min_offset = self.min_offset.min(offset);
        self.max_offset = self.max_offset.max(offset);
        self.offset_histogram[(31 - offset.leading_zeros()) as usize] += 1;
    }

    /// Fraction of emitted bytes covered by matches.
    pub fn matched_fraction(&self) -> f64 {
        let total = self.total_match_length + self.total_literal_length;
        if total == 0 {
            0.0
        } else {
            self.total_match_length as f64 / total as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds-checked output sink
// ---------------------------------------------------------------------------

struct Sink<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink<'a> {
    fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, pos: 0 }
    }

    fn written(&self) -> usize {
        self.pos
    }

    #[inline]
    fn grow(&mut self, n: usize) -> Result<usize, CompressError> {
        let start = self.pos;
        let needed = start + n;
        if needed > self.dst.len() {
            return Err(CompressError::OutputTooSmall {
                needed,
                capacity: self.dst.len(),
            });
        }
        self.pos = needed;
        Ok(start)
    }

    #[inline]
    fn put_u8(&mut self, b: u8) -> Result<(), CompressError> {
        let at = self.grow(1)?;
        self.dst[at] = b;
        Ok(())
    }

    #[inline]
    fn put_slice(&mut self, s: &[u8]) -> Result<(), CompressError> {
        let at = self.grow(s.len())?;
        self.dst[at..at + s.len()].copy_from_slice(s);
        Ok(())
    }

    #[inline]
    fn put_u32_le(&mut self, v: u32) -> Result<(), CompressError> {
        self.put_slice(&v.to_le_bytes())
    }
}

// ---------------------------------------------------------------------------
// Block emission
// ---------------------------------------------------------------------------

/// Write a length extension: the amount beyond the token nibble, as a run
/// of 0xFF bytes and a final remainder byte in 0..=254.
fn put_length_extension(sink: &mut Sink<'_>, mut remainder: u64) -> Result<(), CompressError> {
    while remainder >= 255 {
        sink.put_u8(0xFF)?;
        remainder -= 255;
    }
    sink.put_u8(remainder as u8)
}

/// Emit one match block: token, literal-length extension, literals, offset,
/// match-length extension. `match_code` carries the minimum-match bias
/// already subtracted.
fn put_block(
    sink: &mut Sink<'_>,
    literals: &[u8],
    offset: u32,
    match_code: u64,
) -> Result<(), CompressError> {
    let literal_length = literals.len() as u64;
    let lit_nibble = literal_length.min(RUN_MASK as u64) as u8;
    let ml_nibble = match_code.min(ML_MASK as u64) as u8;

    sink.put_u8((lit_nibble << ML_BITS) | ml_nibble)?;
    if literal_length >= RUN_MASK as u64 {
        put_length_extension(sink, literal_length - RUN_MASK as u64)?;
    }
    sink.put_slice(literals)?;
    sink.put_u32_le(offset)?;
    if match_code >= ML_MASK as u64 {
        put_length_extension(sink, match_code - ML_MASK as u64)?;
    }
    Ok(())
}

/// Emit the trailing run: literals only, no offset, no match length. The
/// decoder recognises it by input exhaustion.
fn put_trailing(sink: &mut Sink<'_>, literals: &[u8]) -> Result<(), CompressError> {
    let literal_length = literals.len() as u64;
    let lit_nibble = literal_length.min(RUN_MASK as u64) as u8;

    sink.put_u8(lit_nibble << ML_BITS)?;
    if literal_length >= RUN_MASK as u64 {
        put_length_extension(sink, literal_length - RUN_MASK as u64)?;
    }
    sink.put_slice(literals)
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

struct Compressor<'a> {
    params: Params,
    window_size: u64,
    input: &'a [u8],
    /// Start of the pending literal run.
    anchor: usize,
    /// Position whose window `last_sum` covers.
    last_hashed: usize,
    last_sum: u32,
    /// Trailing insertion cursor, live only when `params.lag > 0`.
    lag_pos: usize,
    lag_sum: u32,
    hasher: RollingHash,
    table: MatchTable,
    stats: CompressStats,
}

impl Compressor<'_> {
    fn run(&mut self, sink: &mut Sink<'_>) -> Result<(), CompressError> {
        let input = self.input;
        let imatch_limit = input.len() - self.params.min_match;

        // Seed the rolling checksum at position 0. Position 0 itself is
        // never inserted, so offset 0 stays free as the empty sentinel.
        self.last_sum = self.hasher.checksum(input);
        self.last_hashed = 0;
        self.lag_sum = self.last_sum;
        self.lag_pos = 0;

        let mut pos = 0usize;
        while pos < imatch_limit {
            pos += 1;
            let sum = self.advance_hash(pos);
            // Probe before inserting, so the position cannot match itself.
            let best = matching::find_best_entry(
                &self.table,
                input,
                pos,
                self.anchor,
                sum,
                self.window_size,
                self.params.min_match,
            );
            self.insert_position(pos, sum);
            if let Some(m) = best {
                pos = self.emit_block(sink, pos, &m)?;
            }
        }

        let tail = &input[self.anchor..];
        self.stats.total_literal_length += tail.len() as u64;
        put_trailing(sink, tail)
    }

    /// Slide the rolling checksum from `pos - 1` to `pos`, advancing the
    /// lag cursor in step once the read cursor has cleared the lag.
    #[inline]
    fn advance_hash(&mut self, pos: usize) -> u32 {
        debug_assert_eq!(self.last_hashed + 1, pos);
        let h = self.params.hash_length;
        self.last_sum = self
            .hasher
            .update(self.last_sum, self.input[pos - 1], self.input[pos - 1 + h]);
        self.last_hashed = pos;

        if self.params.lag > 0 && pos as u64 > self.params.lag {
            self.lag_sum =
                self.hasher
                    .update(self.lag_sum, self.input[self.lag_pos], self.input[self.lag_pos + h]);
            self.lag_pos += 1;
        }
        self.last_sum
    }

    /// Insert the current position into the table when the sampling mask
    /// selects it. With lag enabled, the entry references the lag cursor
    /// instead of the current position.
    #[inline]
    fn insert_position(&mut self, pos: usize, sum: u32) {
        if (pos as u64) & self.params.sample_mask != self.params.sample_mask {
            return;
        }
        let (entry_pos, entry_sum) = if self.params.lag > 0 && self.lag_pos > 0 {
            (self.lag_pos, self.lag_sum)
        } else {
            (pos, sum)
        };
        let hash = self.table.bucket_index(entry_sum);
        self.table.insert(
            hash,
            HashEntry {
                offset: entry_pos as u32,
                checksum: entry_sum,
            },
        );
    }

    /// Emit the block for an accepted match and return the new read
    /// position (one past the match).
    fn emit_block(
        &mut self,
        sink: &mut Sink<'_>,
        pos: usize,
        m: &BestMatch,
    ) -> Result<usize, CompressError> {
        let input = self.input;
        let match_start = pos - m.backward;
        let copy_start = m.candidate - m.backward;
        let literals = &input[self.anchor..match_start];
        let offset = (match_start - copy_start) as u32;
        let total_length = m.forward + m.backward;
        let match_code = (total_length - self.params.min_match) as u64;

        put_block(sink, literals, offset, match_code)?;
        self.stats
            .record_match(literals.len() as u64, offset, total_length as u64);

        // Re-seed the rolling state across the spanned region, still
        // inserting at sampled positions, then park the anchor past the
        // match. Near the end of the input the walk stops at the last
        // position with a full hash window; the main loop is already past
        // its own limit there.
        let new_ip = pos + m.forward;
        let ihash_limit = input.len() - self.params.hash_length;
        while self.last_hashed < new_ip.min(ihash_limit) {
            let p = self.last_hashed + 1;
            let sum = self.advance_hash(p);
            self.insert_position(p, sum);
        }
        self.anchor = new_ip;
        Ok(new_ip)
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compress `src` into `dst` with the default parameters, returning the
/// number of bytes written.
pub fn compress(src: &[u8], dst: &mut [u8]) -> Result<usize, CompressError> {
    compress_with_params(src, dst, &Params::DEFAULT)
}

/// Compress with explicit parameters. The decompressor must be given the
/// same `min_match`.
pub fn compress_with_params(
    src: &[u8],
    dst: &mut [u8],
    params: &Params,
) -> Result<usize, CompressError> {
    compress_with_stats(src, dst, params).map(|(written, _)| written)
}

/// Compress and return the emission statistics alongside the output size.
pub fn compress_with_stats(
    src: &[u8],
    dst: &mut [u8],
    params: &Params,
) -> Result<(usize, CompressStats), CompressError> {
    params.validate()?;
    if src.len() > u32::MAX as usize {
        return Err(CompressError::SourceTooLarge { len: src.len() });
    }
    debug!(
        "compress: {} bytes in, window 2^{}, min match {}, hash window {}, \
         table 2^{} B ({} buckets x {}), sample mask {:#x}, lag {}",
        src.len(),
        params.window_log,
        params.min_match,
        params.hash_length,
        params.mem_log,
        params.num_buckets(),
        params.bucket_size(),
        params.sample_mask,
        params.lag
    );

    let mut sink = Sink::new(dst);

    // Too short for any match: a single trailing run carries everything.
    if src.len() <= params.min_match {
        let mut stats = CompressStats::default();
        stats.total_literal_length = src.len() as u64;
        put_trailing(&mut sink, src)?;
        return Ok((sink.written(), stats));
    }

    let mut cctx = Compressor {
        params: *params,
        window_size: params.window_size(),
        input: src,
        anchor: 0,
        last_hashed: 0,
        last_sum: 0,
        lag_pos: 0,
        lag_sum: 0,
        hasher: RollingHash::new(params.hash_length),
        table: MatchTable::new(params),
        stats: CompressStats::default(),
    };
    cctx.run(&mut sink)?;

    let stats = &cctx.stats;
    if stats.num_matches > 0 {
        debug!(
            "compress: {} matches, {:.3}% matched, avg match {:.1}, avg literal {:.1}, \
             avg offset {:.1}, offsets {}..={}",
            stats.num_matches,
            100.0 * stats.matched_fraction(),
            stats.total_match_length as f64 / stats.num_matches as f64,
            stats.total_literal_length as f64 / stats.num_matches as f64,
            stats.total_offset as f64 / stats.num_matches as f64,
            stats.min_offset,
            stats.max_offset
        );
    } else {
        debug!("compress: no matches");
    }
    debug!(
        "compress: {} bytes out, table occupancy {}/{} ({:.3}%)",
        sink.written(),
        cctx.table.occupied(),
        cctx.table.num_entries(),
        100.0 * cctx.table.occupied() as f64 / cctx.table.num_entries() as f64
    );

    Ok((sink.written(), cctx.stats))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
