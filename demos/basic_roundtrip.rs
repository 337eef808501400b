// Compress a file (or built-in sample data) and verify the roundtrip.
//
// Usage: cargo run --example basic_roundtrip [FILE]

use oxildm::codec;
use oxildm::engine;

fn main() {
    let data = match std::env::args().nth(1) {
        Some(path) => std::fs::read(&path).expect("read input file"),
        None => {
            // Sample with obvious long-range redundancy: a pseudo-random
            // half, repeated.
            let mut half = Vec::with_capacity(512 * 1024);
            let mut s = 0x1234_5678_9ABC_DEF0u64;
            while half.len() < 512 * 1024 {
                s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
                half.extend_from_slice(&s.to_le_bytes());
            }
            let mut data = half.clone();
            data.extend_from_slice(&half);
            data
        }
    };

    let compressed = engine::compress_to_vec(&data).expect("compress");
    println!(
        "{} -> {} bytes ({:.2}%), bound was {}",
        data.len(),
        compressed.len(),
        100.0 * compressed.len() as f64 / data.len().max(1) as f64,
        codec::compress_bound(data.len())
    );

    let restored = engine::decompress_to_vec(&compressed, data.len()).expect("decompress");
    assert_eq!(restored, data);
    println!("roundtrip ok");
}
