// File-level helpers: container framing, buffered I/O, stats.
//
// `compress_file()` and `decompress_file()` wrap the one-shot codec with
// the 16-byte container header and buffered reads/writes. The whole input
// is held in memory — the codec's window spans the entire buffer, so there
// is nothing to stream. SHA-256 digests of the raw payloads are computed
// when the `file-io` feature is enabled.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::{self, CompressError, DecompressError, FrameHeader, HEADER_SIZE};
use crate::hash::config::Params;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressFileStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes, container header included.
    pub output_size: u64,
    /// Number of match blocks emitted.
    pub num_matches: u64,
    /// Bytes of the input covered by matches.
    pub matched_bytes: u64,
    /// SHA-256 of the input file (if the `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressFileStats {
    /// Compressed input file size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if the `file-io` feature is
    /// enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("compress error: {0}")]
    Compress(#[from] CompressError),
    #[error("decompress error: {0}")]
    Decompress(#[from] DecompressError),
    #[error("invalid container: {0}")]
    InvalidFrame(String),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// compress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path` (container header + payload).
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    params: &Params,
) -> Result<CompressFileStats, IoError> {
    let input = std::fs::read(input_path)?;
    let input_size = input.len() as u64;

    #[cfg(feature = "file-io")]
    let input_sha256 = {
        let mut h = sha2::Sha256::new();
        h.update(&input);
        Some(h.finalize().into())
    };
    #[cfg(not(feature = "file-io"))]
    let input_sha256: Option<[u8; 32]> = None;

    let mut payload = vec![0u8; codec::compress_bound(input.len())];
    let (written, stats) = codec::compress_with_stats(&input, &mut payload, params)?;
    payload.truncate(written);

    let header = FrameHeader {
        compressed_size: written as u64,
        decompressed_size: input_size,
    };

    let output_file = File::create(output_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, output_file);
    header.encode(&mut writer)?;
    writer.write_all(&payload)?;
    writer.flush()?;

    Ok(CompressFileStats {
        input_size,
        output_size: (HEADER_SIZE + written) as u64,
        num_matches: stats.num_matches,
        matched_bytes: stats.total_match_length,
        input_sha256,
    })
}

// ---------------------------------------------------------------------------
// decompress_file
// ---------------------------------------------------------------------------

/// Decompress `input_path` (container header + payload) into `output_path`.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    params: &Params,
) -> Result<DecompressFileStats, IoError> {
    let mut input_file = File::open(input_path)?;
    let header = FrameHeader::decode(&mut input_file)?;

    let mut payload = Vec::new();
    input_file.read_to_end(&mut payload)?;
    if payload.len() as u64 != header.compressed_size {
        return Err(IoError::InvalidFrame(format!(
            "header promises {} payload bytes, file carries {}",
            header.compressed_size,
            payload.len()
        )));
    }
    let decompressed_size = usize::try_from(header.decompressed_size)
        .map_err(|_| IoError::InvalidFrame("decompressed size exceeds address space".into()))?;

    let mut output = vec![0u8; decompressed_size];
    let written = codec::decompress_with_params(&payload, &mut output, params)?;
    if written != decompressed_size {
        return Err(IoError::InvalidFrame(format!(
            "header promises {decompressed_size} decompressed bytes, payload decodes to {written}"
        )));
    }

    #[cfg(feature = "file-io")]
    let output_sha256 = {
        let mut h = sha2::Sha256::new();
        h.update(&output);
        Some(h.finalize().into())
    };
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    let output_file = File::create(output_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, output_file);
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(DecompressFileStats {
        input_size: (HEADER_SIZE + payload.len()) as u64,
        output_size: written as u64,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(name: &str, data: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("oxildm_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    fn cleanup_temp_files(paths: &[&Path]) {
        for p in paths {
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn compress_decompress_file_roundtrip() {
        let data: Vec<u8> = (0..=255u8).cycle().take(200 * 1024).collect();

        let input_path = write_temp_file("input.bin", &data);
        let packed_path = write_temp_file("packed.ldm", b"");
        let output_path = write_temp_file("output.bin", b"");

        let c_stats = compress_file(&input_path, &packed_path, &Params::DEFAULT).unwrap();
        assert_eq!(c_stats.input_size, data.len() as u64);
        assert!(c_stats.output_size < c_stats.input_size);
        assert!(c_stats.num_matches >= 1);

        let d_stats = decompress_file(&packed_path, &output_path, &Params::DEFAULT).unwrap();
        assert_eq!(d_stats.output_size, data.len() as u64);

        assert_eq!(std::fs::read(&output_path).unwrap(), data);

        cleanup_temp_files(&[&input_path, &packed_path, &output_path]);
    }

    #[test]
    fn empty_file_roundtrip() {
        let input_path = write_temp_file("empty_in.bin", b"");
        let packed_path = write_temp_file("empty_packed.ldm", b"");
        let output_path = write_temp_file("empty_out.bin", b"");

        compress_file(&input_path, &packed_path, &Params::DEFAULT).unwrap();
        // Header plus the single trailing token.
        assert_eq!(
            std::fs::metadata(&packed_path).unwrap().len(),
            HEADER_SIZE as u64 + 1
        );

        let d_stats = decompress_file(&packed_path, &output_path, &Params::DEFAULT).unwrap();
        assert_eq!(d_stats.output_size, 0);
        assert!(std::fs::read(&output_path).unwrap().is_empty());

        cleanup_temp_files(&[&input_path, &packed_path, &output_path]);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let data = vec![0x42u8; 4096];
        let input_path = write_temp_file("trunc_in.bin", &data);
        let packed_path = write_temp_file("trunc_packed.ldm", b"");

        compress_file(&input_path, &packed_path, &Params::DEFAULT).unwrap();
        let mut packed = std::fs::read(&packed_path).unwrap();
        packed.pop();
        std::fs::write(&packed_path, &packed).unwrap();

        let output_path = write_temp_file("trunc_out.bin", b"");
        let err = decompress_file(&packed_path, &output_path, &Params::DEFAULT).unwrap_err();
        assert!(matches!(err, IoError::InvalidFrame(_)), "got {err:?}");

        cleanup_temp_files(&[&input_path, &packed_path, &output_path]);
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn sha256_digests_match_across_roundtrip() {
        let data = b"payload for digest checks, long enough to be distinct";
        let input_path = write_temp_file("sha_in.bin", data);
        let packed_path = write_temp_file("sha_packed.ldm", b"");
        let output_path = write_temp_file("sha_out.bin", b"");

        let c_stats = compress_file(&input_path, &packed_path, &Params::DEFAULT).unwrap();
        let d_stats = decompress_file(&packed_path, &output_path, &Params::DEFAULT).unwrap();

        assert!(c_stats.input_sha256.is_some());
        assert_eq!(c_stats.input_sha256, d_stats.output_sha256);

        cleanup_temp_files(&[&input_path, &packed_path, &output_path]);
    }
}
