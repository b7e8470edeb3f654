//! Fuzz target for line framing
//!
//! Splits the input at an arbitrary point to simulate fragmented reads and
//! checks that the codec never yields a line containing a terminator.

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use slirc_client::IrcCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let Some((&split, data)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(data.len());

    let mut codec = IrcCodec::default().with_max_line_len(128);
    let mut buf = BytesMut::new();
    for chunk in [&data[..split], &data[split..]] {
        buf.extend_from_slice(chunk);
        while let Ok(Some(line)) = codec.decode(&mut buf) {
            assert!(!line.contains('\n'));
            assert!(line.len() <= 128 * 3);
        }
    }
    let _ = codec.decode_eof(&mut buf);
});
