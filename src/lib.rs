//! Oxildm: long-distance matching (LDM) pre-compression in Rust.
//!
//! A single-pass compressor that finds repeated byte sequences across very
//! large windows (gigabyte scale) and emits them as (literal run,
//! back-reference) blocks in a compact binary stream. The output is raw LZ:
//! the intended use is as a pre-pass in front of a shorter-window entropy
//! coder, eliminating long-range redundancy cheaply.
//!
//! The crate provides:
//! - The rolling-hash match index (`hash`)
//! - The block compressor, decoder and container header (`codec`)
//! - A one-shot owned-buffer API (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use oxildm::engine;
//!
//! let data = std::fs::read("big.dat").unwrap();
//! let compressed = engine::compress_to_vec(&data).unwrap();
//! let restored = engine::decompress_to_vec(&compressed, data.len()).unwrap();
//! assert_eq!(restored, data);
//! ```

pub mod codec;
pub mod engine;
pub mod hash;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
