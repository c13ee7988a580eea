#![no_main]

use debdb::version::Version;
use libfuzzer_sys::fuzz_target;

// Round-trip: anything that parses must format back to an equal
// version.
fuzz_target!(|data: &str| {
    let Ok(v) = data.parse::<Version>() else {
        return;
    };
    let again: Version = v.to_string().parse().unwrap();
    assert_eq!(v, again);
});
