#![no_main]

use debdb::control::parse_file;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = parse_file("fuzz", data);
});
