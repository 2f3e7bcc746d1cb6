use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mzmerge::align::{align, AlignmentSummary};
use mzmerge::merge::{bin_spectra, MergeConfig, SpectralMerger};
use mzmerge::spectrum::Spectrum;
use mzmerge::tolerance::ToleranceWindow;

/// Replicate scans whose peaks drift by a few ppm
fn create_scans(num_spectra: usize, peaks_per_spectrum: usize) -> Vec<Spectrum> {
    (0..num_spectra)
        .map(|scan| {
            let mut positions = Vec::with_capacity(peaks_per_spectrum);
            let mut intensities = Vec::with_capacity(peaks_per_spectrum);
            for j in 0..peaks_per_spectrum {
                let mz = 200.0 + j as f64 * 1.7;
                positions.push(mz + ((scan * 7 + j) as f64).sin() * mz * 3e-6);
                intensities.push(1000.0 + ((j * 13 + scan) % 97) as f64 * 100.0);
            }
            Spectrum::new(positions, intensities).unwrap()
        })
        .collect()
}

/// Benchmark merging a growing number of scans
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let merger = SpectralMerger::new(MergeConfig::ms1()).unwrap();

    for num_spectra in [2, 10, 50] {
        let peaks_per_spectrum = 1000;
        let scans = create_scans(num_spectra, peaks_per_spectrum);

        group.throughput(Throughput::Elements((num_spectra * peaks_per_spectrum) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}spectra", num_spectra)),
            &scans,
            |b, scans| {
                b.iter(|| black_box(merger.merge(scans)));
            },
        );
    }

    group.finish();
}

/// Benchmark merging many bins on the rayon pool
fn bench_merge_binned(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_binned");
    let merger = SpectralMerger::new(MergeConfig::ms1()).unwrap();

    for bin_width in [5, 20] {
        let scans = create_scans(200, 500);
        let bins = bin_spectra(scans.into_iter().enumerate().map(|(i, s)| (i as i64, s)), bin_width)
            .unwrap();

        group.throughput(Throughput::Elements(200 * 500));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("width{}", bin_width)),
            &bins,
            |b, bins| {
                b.iter(|| black_box(merger.merge_binned(bins)));
            },
        );
    }

    group.finish();
}

/// Benchmark pairwise alignment and scoring
fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    let tolerance = ToleranceWindow::from_ppm(0.005, 10.0).unwrap();

    for peaks in [100, 1000, 5000] {
        let scans = create_scans(2, peaks);

        group.throughput(Throughput::Elements((2 * peaks) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(peaks), &scans, |b, scans| {
            b.iter(|| {
                let pairs = align(&scans[0], &scans[1], tolerance);
                black_box(AlignmentSummary::from_pairs(&pairs))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_merge_binned, bench_align);
criterion_main!(benches);
