use criterion::{criterion_group, criterion_main, Criterion};
use debdb::control::parse_file;

const STANZA: &str = "\
Package: debdb
Status: install ok installed
Priority: optional
Section: admin
Installed-Size: 6388
Maintainer: Some Person <person@example.org>
Architecture: amd64
Version: 1.21.22
Depends: libbz2-1.0, libc6 (>= 2.15), liblzma5 (>= 5.2.2), libselinux1 (>= 3.1), zlib1g (>= 1:1.1.4)
Pre-Depends: libc6 (>= 2.15)
Suggests: apt, debsig-verify
Conffiles:
 /etc/alternatives/README 69c4ba7f08363e998e0f2e244a04f881
 /etc/cron.daily/dpkg f20e2accf2c9f9f7bb3c4c5f53b9f26d
Description: package management system
 This package provides the low-level infrastructure for handling the
 installation and removal of software packages.
";

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("paragraph");

    group.bench_function("single_stanza", |b| {
        b.iter(|| {
            let _ = parse_file("bench", STANZA).unwrap();
        })
    });

    let many = (0..100).map(|_| STANZA).collect::<Vec<_>>().join("\n");
    group.bench_function("hundred_stanzas", |b| {
        b.iter(|| {
            let _ = parse_file("bench", &many).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
