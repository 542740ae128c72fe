//! Fuzz target for Command::decode
//!
//! Arbitrary lines must decode or fail with an error, never panic. Lines that
//! do decode must re-encode to a single line that decodes to the same command.

#![no_main]

use libfuzzer_sys::fuzz_target;
use limbo_proto::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(command) = Command::decode(line) {
        let encoded = command.encode().expect("decoded command must encode");
        assert!(!encoded.contains('\n'));
        assert_eq!(Command::decode(&encoded).expect("re-decode"), command);
    }
});
