#[path = "../tests/fixtures/mod.rs"]
mod fixtures;

use crate::fixtures::load_reference_ohlcvs;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use std::{hint::black_box, time::Duration};
use value_area::{PriceBin, ProfileConfig, VolumeProfile, build_histogram, resolve_value_area};

const BIN_COUNTS: [usize; 3] = [50, 100, 500];

fn histogram_benchmarks(c: &mut Criterion) {
    let bars = load_reference_ohlcvs();
    let mut group = c.benchmark_group("histogram");
    group.throughput(Throughput::Elements(bars.len() as u64));
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));

    for bins_count in BIN_COUNTS {
        group.bench_function(format!("bins{bins_count}"), |b| {
            b.iter(|| black_box(build_histogram(black_box(&bars), bins_count)));
        });
    }

    group.finish();
}

fn resolve_benchmarks(c: &mut Criterion) {
    let bars = load_reference_ohlcvs();
    let mut group = c.benchmark_group("resolve");
    group.sample_size(200);
    group.noise_threshold(0.03);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));

    for bins_count in BIN_COUNTS {
        let bins: Vec<PriceBin> = build_histogram(&bars, bins_count)
            .expect("valid histogram")
            .into_bins();

        group.bench_function(format!("bins{bins_count}"), |b| {
            b.iter(|| black_box(resolve_value_area(black_box(&bins), 0.7)));
        });
    }

    group.finish();
}

fn profile_benchmarks(c: &mut Criterion) {
    let bars = load_reference_ohlcvs();
    let mut group = c.benchmark_group("profile");
    group.throughput(Throughput::Elements(bars.len() as u64));
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));

    for bins_count in BIN_COUNTS {
        let config = ProfileConfig::new(bins_count, 0.7).expect("valid config");

        group.bench_function(format!("bins{bins_count}"), |b| {
            b.iter_batched(
                || config,
                |config| {
                    let profile = VolumeProfile::compute(&bars, &config);
                    black_box(profile.map(|p| p.classified_bins()))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    histogram_benchmarks,
    resolve_benchmarks,
    profile_benchmarks
);
criterion_main!(benches);
