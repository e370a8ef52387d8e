use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::Path;
use std::time::Duration;
use xlbench_io::{HlpiRecord, Variant, WriteOptions};
use xlbench_table::project;

// Fixture rows are repeated this many times; 1 keeps the bundled size.
fn bench_repeat() -> usize {
    std::env::var("XLBENCH_BENCH_REPEAT")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (1..=1_000).contains(&v))
        .unwrap_or(1)
}

fn load_fixture() -> Vec<HlpiRecord> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../benchmarks/fixtures/hlpi.csv");
    let records: Vec<HlpiRecord> = xlbench_io::csv::load_records(&path).unwrap();
    let repeat = bench_repeat();
    records.iter().cycle().take(records.len() * repeat).cloned().collect()
}

fn bench_writers(c: &mut Criterion) {
    let records = load_fixture();
    let options = WriteOptions::default();

    let mut group = c.benchmark_group("writers");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(records.len() as u64));

    for variant in Variant::ALL {
        group.bench_with_input(BenchmarkId::new(variant.name(), records.len()), &records, |b, records| {
            b.iter(|| {
                let bytes = variant.run(records, &options).unwrap();
                black_box(bytes);
            })
        });
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let records = load_fixture();

    c.bench_function("project_hlpi", |b| {
        b.iter(|| black_box(project(black_box(&records))))
    });
}

criterion_group!(benches, bench_writers, bench_projection);
criterion_main!(benches);
