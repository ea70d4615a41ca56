//! Benchmarks for the resonator.
//!
//! Run:
//! - cargo bench
//! - cargo bench --features simd-wide

use std::f32::consts::PI;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use resonare::synth::resonator::Resonator;
use resonare::EngineContext;

const FS: f32 = 48_000.0;
const BLOCK_LENS: [usize; 3] = [64, 256, 1024];
const RESOLUTIONS: [usize; 4] = [1, 8, 32, 64];

fn make_sine(block_len: usize, fs: f32) -> Vec<f32> {
    let step = 2.0 * PI * 440.0 / fs;
    (0..block_len).map(|i| (step * i as f32).sin()).collect()
}

fn make_resonator(resolution: usize) -> Box<Resonator> {
    let ctx = EngineContext::new(FS).unwrap();
    let mut r = Box::new(Resonator::new(&ctx));
    r.set_frequency_hz(55.0);
    r.set_resolution(resolution);
    r.compute_filters();
    r
}

fn bench_process_sine(c: &mut Criterion) {
    let mut group = c.benchmark_group("resonator_process_sine");
    group.sample_size(50);

    for &resolution in &RESOLUTIONS {
        for &block_len in &BLOCK_LENS {
            let input = make_sine(block_len, FS);
            let mut center = vec![0.0; block_len];
            let mut sides = vec![0.0; block_len];
            let mut r = make_resonator(resolution);

            let id = BenchmarkId::new("case", format!("m{resolution}_b{block_len}"));
            group.bench_with_input(id, &input, |b, input| {
                b.iter(|| {
                    r.panic();
                    r.process(None, black_box(input), &mut center, &mut sides);
                    black_box((&center, &sides));
                });
            });
        }
    }

    group.finish();
}

fn bench_process_bowed(c: &mut Criterion) {
    let mut group = c.benchmark_group("resonator_process_bowed");
    group.sample_size(50);

    for &block_len in &BLOCK_LENS {
        let silence = vec![0.0; block_len];
        let bow = vec![0.7; block_len];
        let mut center = vec![0.0; block_len];
        let mut sides = vec![0.0; block_len];
        let mut r = make_resonator(64);

        let id = BenchmarkId::new("case", format!("b{block_len}"));
        group.bench_with_input(id, &bow, |b, bow| {
            b.iter(|| {
                r.process(Some(black_box(bow)), &silence, &mut center, &mut sides);
                black_box((&center, &sides));
            });
        });
    }

    group.finish();
}

fn bench_compute_filters(c: &mut Criterion) {
    let mut r = make_resonator(64);
    let mut geometry = 0.0f32;
    c.bench_function("resonator_compute_filters", |b| {
        b.iter(|| {
            geometry = (geometry + 0.013) % 1.0;
            r.set_geometry(geometry);
            black_box(r.compute_filters());
        });
    });
}

criterion_group!(
    resonator_bank,
    bench_process_sine,
    bench_process_bowed,
    bench_compute_filters
);
criterion_main!(resonator_bank);
