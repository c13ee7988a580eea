use criterion::{criterion_group, criterion_main, Criterion};
use debdb::version::Version;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_to_string");

    let simple: Version = "1.0".parse().unwrap();
    group.bench_function("simple", |b| {
        b.iter(|| {
            let _ = simple.to_string();
        })
    });

    let full: Version = "1:1.0-1".parse().unwrap();
    group.bench_function("full", |b| {
        b.iter(|| {
            let _ = full.to_string();
        })
    });

    let long: Version = "1:0.0~git20170407.0.55a552f+REALLY.0.0~git20161012.0.5f31782-1+deb8u1"
        .parse()
        .unwrap();
    group.bench_function("long", |b| {
        b.iter(|| {
            let _ = long.to_string();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
