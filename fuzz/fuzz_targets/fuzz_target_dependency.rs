#![no_main]

use debdb::dependency::{DepKind, Dependency};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(deps) = Dependency::parse_list(DepKind::Depends, data) else {
        return;
    };
    for dep in &deps {
        let _ = dep.to_string();
    }
});
