use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pitchsh::audio::decoder;
use pitchsh::streaming::window;
use pitchsh::{PitchEstimator, SampleBuffer, SpectralAnalyzer};
use std::f64::consts::PI;
use std::hint::black_box;

const RATE: u32 = 48000;

fn tone(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * 440.0 * i as f64 / RATE as f64).sin() as f32)
        .collect()
}

/// FFT plus peak pick for the window sizes a monitor typically runs with.
fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    let estimator = PitchEstimator::new(RATE);

    for size in [4096usize, 16384, 48000] {
        let samples = tone(size);
        let mut analyzer = SpectralAnalyzer::new();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| {
                let spectrum = analyzer.transform(black_box(samples));
                black_box(estimator.estimate(&spectrum))
            })
        });
    }

    group.finish();
}

/// One full analysis tick against a ring holding four windows.
fn bench_tick(c: &mut Criterion) {
    let buffer = SampleBuffer::for_windows(48000, 4);
    buffer.append(&decoder::encode(&tone(48000 * 4)));
    let mut analyzer = SpectralAnalyzer::new();
    let estimator = PitchEstimator::new(RATE);

    c.bench_function("tick_48000", |b| {
        b.iter(|| {
            let bytes = buffer.snapshot();
            let Ok(samples) = decoder::decode(&bytes) else {
                return None;
            };
            let spectrum = analyzer.transform(window::extract(&samples, 48000));
            Some(black_box(estimator.estimate(&spectrum)))
        })
    });
}

criterion_group!(benches, bench_estimate, bench_tick);
criterion_main!(benches);
