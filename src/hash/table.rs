// Bucketed match table.
//
// A fixed-capacity associative store of (offset, checksum) entries. Each
// bucket holds `1 << bucket_log` entries and a one-byte write cursor that
// always points at the oldest entry, giving FIFO replacement inside the
// bucket. There is no deduplication and no resizing; the whole table is
// allocated once per compression.
//
// `offset == 0` marks an empty slot. Position 0 of the input is never
// inserted, so the sentinel cannot collide with a live entry.

use super::config::Params;
use super::rolling::HashCfg;

/// One indexed position: where it is and what its window hashed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEntry {
    /// Byte index into the input. 0 means the slot is empty.
    pub offset: u32,
    /// Rolling checksum of the `hash_length` bytes at `offset` when the
    /// entry was inserted.
    pub checksum: u32,
}

impl HashEntry {
    pub const EMPTY: HashEntry = HashEntry {
        offset: 0,
        checksum: 0,
    };

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }
}

/// The match table: `num_buckets * bucket_size` entries plus one FIFO
/// cursor per bucket.
pub struct MatchTable {
    cfg: HashCfg,
    bucket_log: u32,
    bucket_mask: u8,
    entries: Vec<HashEntry>,
    cursors: Vec<u8>,
}

impl MatchTable {
    /// Allocate a table sized from `params` (callers validate first).
    pub fn new(params: &Params) -> Self {
        let cfg = HashCfg::new(params.hash_log());
        let num_buckets = cfg.num_buckets();
        let bucket_size = params.bucket_size();
        Self {
            cfg,
            bucket_log: params.bucket_log,
            bucket_mask: (bucket_size - 1) as u8,
            entries: vec![HashEntry::EMPTY; num_buckets * bucket_size],
            cursors: vec![0u8; num_buckets],
        }
    }

    /// Bucket index for a checksum.
    #[inline(always)]
    pub fn bucket_index(&self, sum: u32) -> usize {
        self.cfg.bucket(sum)
    }

    /// All entries of one bucket, in index order. Empty slots have
    /// `offset == 0`.
    #[inline(always)]
    pub fn bucket(&self, hash: usize) -> &[HashEntry] {
        let start = hash << self.bucket_log;
        &self.entries[start..start + (1 << self.bucket_log)]
    }

    /// Write `entry` over the oldest slot of its bucket and advance the
    /// bucket's FIFO cursor.
    #[inline(always)]
    pub fn insert(&mut self, hash: usize, entry: HashEntry) {
        let cursor = self.cursors[hash];
        self.entries[(hash << self.bucket_log) + cursor as usize] = entry;
        self.cursors[hash] = cursor.wrapping_add(1) & self.bucket_mask;
    }

    /// Bucket count.
    pub fn num_buckets(&self) -> usize {
        self.cursors.len()
    }

    /// Entries per bucket.
    pub fn bucket_size(&self) -> usize {
        1 << self.bucket_log
    }

    /// Total entry slots.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots, for occupancy reporting.
    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_empty()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
