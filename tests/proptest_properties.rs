use oxildm::codec;
use oxildm::engine;
use oxildm::hash::config::Params;
use oxildm::hash::rolling::RollingHash;
use proptest::prelude::*;

fn small_params(sample_mask: u64, lag: u64) -> Params {
    Params {
        min_match: 4,
        hash_length: 4,
        mem_log: 14,
        sample_mask,
        lag,
        ..Params::DEFAULT
    }
}

proptest! {
    #[test]
    fn prop_roundtrip_default_params(
        input in proptest::collection::vec(any::<u8>(), 0..8192)
    ) {
        let compressed = engine::compress_to_vec(&input).unwrap();
        let restored = engine::decompress_to_vec(&compressed, input.len()).unwrap();
        prop_assert_eq!(restored, input);
    }

    #[test]
    fn prop_roundtrip_small_params(
        input in proptest::collection::vec(any::<u8>(), 0..2048),
        mask_shift in 0u32..4,
        lag in prop_oneof![Just(0u64), Just(8u64), Just(64u64)]
    ) {
        let params = small_params((1u64 << mask_shift) - 1, lag);
        let compressed = engine::compress_to_vec_with_params(&input, &params).unwrap();
        let restored =
            engine::decompress_to_vec_with_params(&compressed, input.len(), &params).unwrap();
        prop_assert_eq!(restored, input);
    }

    #[test]
    fn prop_repetitive_input_roundtrips(
        unit in proptest::collection::vec(any::<u8>(), 1..128),
        repeats in 1usize..64
    ) {
        let input: Vec<u8> = unit.iter().copied().cycle().take(unit.len() * repeats).collect();
        let params = small_params(0, 0);
        let compressed = engine::compress_to_vec_with_params(&input, &params).unwrap();
        let restored =
            engine::decompress_to_vec_with_params(&compressed, input.len(), &params).unwrap();
        prop_assert_eq!(restored, input);
    }

    #[test]
    fn prop_output_never_exceeds_bound(
        input in proptest::collection::vec(any::<u8>(), 0..4096)
    ) {
        let compressed = engine::compress_to_vec(&input).unwrap();
        prop_assert!(compressed.len() <= codec::compress_bound(input.len()));
    }

    #[test]
    fn prop_decoder_is_deterministic(
        input in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        let params = small_params(0, 0);
        let compressed = engine::compress_to_vec_with_params(&input, &params).unwrap();
        let first =
            engine::decompress_to_vec_with_params(&compressed, input.len(), &params).unwrap();
        let second =
            engine::decompress_to_vec_with_params(&compressed, input.len(), &params).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_rolling_checksum_matches_bulk(
        data in proptest::collection::vec(any::<u8>(), 8..512),
        window in 4usize..64
    ) {
        prop_assume!(window < data.len());
        let rh = RollingHash::new(window);
        let mut sum = rh.checksum(&data);
        for i in 0..data.len() - window {
            sum = rh.update(sum, data[i], data[i + window]);
            prop_assert_eq!(sum, rh.checksum(&data[i + 1..]), "slide {} diverged", i);
        }
    }

    #[test]
    fn prop_corrupt_streams_never_panic(
        payload in proptest::collection::vec(any::<u8>(), 0..512),
        capacity in 0usize..2048
    ) {
        // Arbitrary bytes are almost never a valid stream; the decoder must
        // fail cleanly or produce bounded output, never panic.
        let mut dst = vec![0u8; capacity];
        let _ = codec::decompress(&payload, &mut dst);
    }
}
