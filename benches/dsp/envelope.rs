//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibrato_dsp::dsp::envelope::{Envelope, FaderShape};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(env: &mut Envelope, buffer: &mut [f64]) {
    let dt = 1.0 / SAMPLE_RATE;
    for sample in buffer.iter_mut() {
        env.run(dt);
        *sample = env.value();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Attack phase (ramping up), long enough not to finish while measured
        let mut env = Envelope::adsr(1000.0, 0.1, 0.7, 0.3);
        env.start();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Same, through the quarter-sine curve
        let mut env = Envelope::adsr(1000.0, 0.1, 0.7, 0.3).with_shape(FaderShape::QuarterSine);
        env.start();
        group.bench_with_input(BenchmarkId::new("attack_quarter_sine", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        env.start();
        env.run(0.01);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });
    }

    group.finish();
}
