use criterion::{criterion_group, criterion_main, Criterion};
use debdb::version::{Version, VersionRelation};

macro_rules! benchmark_parse {
    ($grp:ident, $name:ident, $version:expr) => {
        $grp.bench_function(stringify!($name), |b| {
            b.iter(|| {
                let _: Version = $version.parse().unwrap();
            })
        });
    };
}

pub fn criterion_benchmark(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("version_parse");

        benchmark_parse!(group, bare, "1.0");
        benchmark_parse!(group, revision, "1.2-3");
        benchmark_parse!(group, tilde_prerelease, "1.0~rc1");
        benchmark_parse!(group, epoch_and_tilde, "2:4.1~beta+b2-0ubuntu1");
        benchmark_parse!(group, security_update, "1:60.9.0-1~deb8u1");
        benchmark_parse!(group, backport, "21.06.0+ds1-2~bpo11+1");
        benchmark_parse!(group, colons_in_upstream, "2:1:0.9-1");
        benchmark_parse!(
            group,
            snapshot,
            "1.0+git20230411.3b22df2-1~bpo11+1"
        );
    }

    {
        // The path a status-database dependency check takes: parse the
        // constraint's version, then evaluate the relation against an
        // installed one.
        let mut group = c.benchmark_group("version_constraint");

        let installed: Version = "2.36-9+deb12u4".parse().unwrap();
        group.bench_function("later_equal", |b| {
            b.iter(|| {
                let wanted: Version = "2.36".parse().unwrap();
                let _ = VersionRelation::LaterEqual.satisfied_by(&installed, &wanted);
            })
        });

        let candidate: Version = "1.0~rc1".parse().unwrap();
        let reference: Version = "1.0".parse().unwrap();
        group.bench_function("tilde_ordering", |b| {
            b.iter(|| {
                let _ = candidate.cmp(&reference);
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
