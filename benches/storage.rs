use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mzmerge::storage::{Storage, StorageConfig};
use tempfile::TempDir;

/// Benchmark copying arrays into mapped segments
fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for len in [100usize, 10_000, 1_000_000] {
        let values: Vec<f64> = (0..len).map(|i| i as f64 * 0.25).collect();
        let temp_dir = TempDir::new().unwrap();

        group.throughput(Throughput::Bytes((len * 8) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &values, |b, values| {
            // fresh storage per batch so segments do not pile up
            b.iter_batched(
                || {
                    let config = StorageConfig {
                        segment_capacity: 64 << 20,
                        store_in_ram: false,
                        temp_dir: Some(temp_dir.path().to_path_buf()),
                    };
                    Storage::new(&config).unwrap()
                },
                |storage| {
                    for _ in 0..8 {
                        black_box(storage.store(values).unwrap().len());
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark summing values through a view against the heap copy
fn bench_read_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_view");
    let len = 1_000_000;
    let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig {
        segment_capacity: 16 << 20,
        store_in_ram: false,
        temp_dir: Some(temp_dir.path().to_path_buf()),
    };
    let storage = Storage::new(&config).unwrap();
    let view = storage.store(&values).unwrap();

    group.throughput(Throughput::Bytes((len * 8) as u64));
    group.bench_function("mapped", |b| b.iter(|| black_box(view.iter().sum::<f64>())));
    group.bench_function("heap", |b| b.iter(|| black_box(values.iter().sum::<f64>())));

    group.finish();
}

criterion_group!(benches, bench_store, bench_read_view);
criterion_main!(benches);
