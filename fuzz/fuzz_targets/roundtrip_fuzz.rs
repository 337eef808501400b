#![no_main]
use libfuzzer_sys::fuzz_target;
use oxildm::engine;
use oxildm::hash::config::Params;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the indexing schedule; the rest is the payload.
    let flags = data[0];
    let payload = &data[1..];
    let params = Params {
        min_match: 4,
        hash_length: 4,
        mem_log: 14,
        sample_mask: (1u64 << (flags & 3)) - 1,
        lag: if flags & 4 != 0 { 8 } else { 0 },
        ..Params::DEFAULT
    };

    let compressed = engine::compress_to_vec_with_params(payload, &params).unwrap();
    let restored =
        engine::decompress_to_vec_with_params(&compressed, payload.len(), &params).unwrap();
    assert_eq!(restored, payload);
});
