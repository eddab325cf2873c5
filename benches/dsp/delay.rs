//! Benchmarks for the history ring buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibrato_dsp::dsp::delay::HistoryBuffer;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Test with different read distances (in samples)
    let read_distances: &[usize] = &[
        480,   // 10ms at 48kHz
        2854,  // a semitone of one second, the engine's base offset
        48000, // 1 second at 48kHz
    ];

    for &size in BLOCK_SIZES {
        // Generate a test signal
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &distance in read_distances {
            let mut history = HistoryBuffer::new();
            group.bench_with_input(
                BenchmarkId::new(format!("push_get_{distance}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for &sample in &input {
                            history.push(sample);
                            sum += history.get(black_box(distance));
                        }
                        sum
                    })
                },
            );
        }
    }

    group.finish();
}
