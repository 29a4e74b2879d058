//! Benchmarks for loupe operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use loupe_ops::{DisplacementField, LensParams, LensSession};

/// Benchmark displacement field computation at typical lens sizes.
fn bench_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("field");

    for size in [64u32, 256, 512].iter() {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("compute", size), size, |b, &s| {
            let params = LensParams::new(500.0, 1.2);
            b.iter(|| DisplacementField::compute(black_box(s), black_box(s), params))
        });
    }

    group.finish();
}

/// Benchmark region extraction through a prepared session.
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for size in [64u32, 256].iter() {
        let mut session = LensSession::new();
        session.set_parameters(500.0, 1.2);
        session.prepare_output(*size, *size).unwrap();
        let src = vec![128u8; 1024 * 1024 * 4];
        session.store_source(1024, 1024, &src).unwrap();

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("region", size), size, |b, &s| {
            b.iter(|| {
                session
                    .extract_region(black_box(100), black_box(100), s)
                    .unwrap()
                    .len()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_field, bench_extract);
criterion_main!(benches);
