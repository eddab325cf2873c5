//! Benchmarks for LFO value and integral lookups.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibrato_dsp::dsp::lfo::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");
    let dt = 1.0 / SAMPLE_RATE;

    let waveforms = [
        ("sine", Waveform::Sine),
        ("triangle", Waveform::Triangle),
        ("square", Waveform::Square),
    ];

    for &size in BLOCK_SIZES {
        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(waveform, 5.0);
            osc.start();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for _ in 0..size {
                        osc.run(black_box(dt));
                        sum += osc.value() + osc.integral();
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
