#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_hooks::core::serialization::decode;
use packet_hooks::IncomingMessage;

fuzz_target!(|data: &[u8]| {
    // Decoding untrusted bytes must fail cleanly, never panic
    let _ = decode::<IncomingMessage>(data);
});
