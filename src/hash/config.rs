// Codec parameters.
//
// Everything here is fixed for the lifetime of a stream: the wire format
// carries no parameter block, so a compressor and the decompressor reading
// its output must be built with the same `Params`.

use thiserror::Error;

/// Log2 of the size of one hash-table entry (4-byte offset + 4-byte checksum).
pub const ENTRY_LOG: u32 = 3;

/// Default maximum back-reference distance: 128 MiB.
pub const DEFAULT_WINDOW_LOG: u32 = 27;

/// Default minimum match length in bytes.
pub const DEFAULT_MIN_MATCH: usize = 64;

/// Default hash-table footprint: 8 MiB of entries.
pub const DEFAULT_MEM_LOG: u32 = 23;

/// Default bucket capacity: 8 entries per bucket.
pub const DEFAULT_BUCKET_LOG: u32 = 3;

/// Default sampling mask: index one position in eight.
pub const DEFAULT_SAMPLE_MASK: u64 = 7;

/// Tuning parameters for the match index and the emit format.
///
/// `min_match` is the only field the decompressor depends on; the rest
/// shape the compressor's search. `validate()` enforces the relations the
/// table layout relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Log2 of the window size; matches farther back than `1 << window_log`
    /// bytes are never referenced.
    pub window_log: u32,
    /// Minimum length of an emitted match. The decoder adds this back to
    /// every encoded match length.
    pub min_match: usize,
    /// Width of the rolling-checksum window. At most `min_match`; equal to
    /// it by default.
    pub hash_length: usize,
    /// Log2 of the hash-table footprint in bytes.
    pub mem_log: u32,
    /// Log2 of the per-bucket entry count.
    pub bucket_log: u32,
    /// A position is inserted into the table only when
    /// `(pos & sample_mask) == sample_mask`. Must be a power of two minus
    /// one; 0 indexes every position.
    pub sample_mask: u64,
    /// Insertion lag: when nonzero, inserted entries reference the position
    /// this many bytes behind the read cursor, so the searcher can probe a
    /// position before it becomes indexed.
    pub lag: u64,
}

impl Params {
    pub const DEFAULT: Params = Params {
        window_log: DEFAULT_WINDOW_LOG,
        min_match: DEFAULT_MIN_MATCH,
        hash_length: DEFAULT_MIN_MATCH,
        mem_log: DEFAULT_MEM_LOG,
        bucket_log: DEFAULT_BUCKET_LOG,
        sample_mask: DEFAULT_SAMPLE_MASK,
        lag: 0,
    };

    /// Maximum permitted back-reference distance.
    #[inline]
    pub fn window_size(&self) -> u64 {
        1u64 << self.window_log
    }

    /// Log2 of the bucket count: `mem_log - ENTRY_LOG - bucket_log`.
    #[inline]
    pub fn hash_log(&self) -> u32 {
        self.mem_log - ENTRY_LOG - self.bucket_log
    }

    /// Number of buckets in the table.
    #[inline]
    pub fn num_buckets(&self) -> usize {
        1usize << self.hash_log()
    }

    /// Entries per bucket.
    #[inline]
    pub fn bucket_size(&self) -> usize {
        1usize << self.bucket_log
    }

    /// Check the structural relations between the fields.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.window_log == 0 || self.window_log > 32 {
            return Err(ParamsError::WindowLog(self.window_log));
        }
        if self.min_match < 4 {
            return Err(ParamsError::MinMatch(self.min_match));
        }
        if self.hash_length < 4 || self.hash_length > self.min_match {
            return Err(ParamsError::HashLength {
                hash_length: self.hash_length,
                min_match: self.min_match,
            });
        }
        // Bucket cursors are a single byte wrapping mod the bucket size.
        if self.bucket_log > 8 {
            return Err(ParamsError::BucketLog(self.bucket_log));
        }
        if self.mem_log <= ENTRY_LOG + self.bucket_log {
            return Err(ParamsError::MemLog {
                mem_log: self.mem_log,
                bucket_log: self.bucket_log,
            });
        }
        if self.hash_log() > 32 {
            return Err(ParamsError::MemLog {
                mem_log: self.mem_log,
                bucket_log: self.bucket_log,
            });
        }
        if self.sample_mask.wrapping_add(1) & self.sample_mask != 0 {
            return Err(ParamsError::SampleMask(self.sample_mask));
        }
        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Structural parameter errors reported by [`Params::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("window_log {0} out of range 1..=32")]
    WindowLog(u32),
    #[error("min_match {0} below minimum of 4")]
    MinMatch(usize),
    #[error("hash_length {hash_length} not in 4..={min_match}")]
    HashLength { hash_length: usize, min_match: usize },
    #[error("mem_log {mem_log} too small for bucket_log {bucket_log}")]
    MemLog { mem_log: u32, bucket_log: u32 },
    #[error("bucket_log {0} exceeds the one-byte cursor limit of 8")]
    BucketLog(u32),
    #[error("sample_mask {0:#x} is not a power of two minus one")]
    SampleMask(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        Params::DEFAULT.validate().unwrap();
    }

    #[test]
    fn default_derived_sizes() {
        let p = Params::DEFAULT;
        // 2^23 bytes of 8-byte entries in buckets of 8 = 2^17 buckets.
        assert_eq!(p.hash_log(), 17);
        assert_eq!(p.num_buckets(), 1 << 17);
        assert_eq!(p.bucket_size(), 8);
        assert_eq!(p.window_size(), 1 << 27);
    }

    #[test]
    fn hash_length_must_not_exceed_min_match() {
        let p = Params {
            hash_length: 65,
            ..Params::DEFAULT
        };
        assert!(matches!(p.validate(), Err(ParamsError::HashLength { .. })));
    }

    #[test]
    fn sample_mask_must_be_contiguous() {
        let p = Params {
            sample_mask: 6,
            ..Params::DEFAULT
        };
        assert!(matches!(p.validate(), Err(ParamsError::SampleMask(6))));
        let p = Params {
            sample_mask: 0,
            ..Params::DEFAULT
        };
        p.validate().unwrap();
        let p = Params {
            sample_mask: 15,
            ..Params::DEFAULT
        };
        p.validate().unwrap();
    }

    #[test]
    fn mem_log_must_leave_room_for_buckets() {
        let p = Params {
            mem_log: 6,
            bucket_log: 3,
            ..Params::DEFAULT
        };
        assert!(matches!(p.validate(), Err(ParamsError::MemLog { .. })));
    }

    #[test]
    fn oversized_buckets_rejected() {
        let p = Params {
            mem_log: 20,
            bucket_log: 9,
            ..Params::DEFAULT
        };
        assert!(matches!(p.validate(), Err(ParamsError::BucketLog(9))));
    }

    #[test]
    fn tiny_window_log_rejected() {
        let p = Params {
            window_log: 0,
            ..Params::DEFAULT
        };
        assert!(matches!(p.validate(), Err(ParamsError::WindowLog(0))));
    }
}
