#![no_main]
use libfuzzer_sys::fuzz_target;
use oxildm::codec;

// Arbitrary bytes fed straight into the decoder: every outcome other than
// a clean Ok/Err is a bug.
fuzz_target!(|data: &[u8]| {
    let mut dst = vec![0u8; data.len().saturating_mul(4).min(1 << 20)];
    let _ = codec::decompress(data, &mut dst);
});
