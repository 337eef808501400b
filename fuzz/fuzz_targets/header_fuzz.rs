#![no_main]
use libfuzzer_sys::fuzz_target;
use oxildm::codec::FrameHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(hdr) = FrameHeader::from_bytes(data) {
        let bytes = hdr.to_bytes();
        assert_eq!(FrameHeader::from_bytes(&bytes).unwrap(), hdr);
    }
});
