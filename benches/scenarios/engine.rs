//! Benchmarks for the complete stereo engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibrato_dsp::dsp::lfo::Waveform;
use vibrato_dsp::engine::router::ModulationMode;
use vibrato_dsp::io::{Controls, MidiEvent, TimedEvent};
use vibrato_dsp::VibratoEngine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    let controls = Controls {
        depth_cents: 50.0,
        tremolo: 0.3,
        osc1_waveform: Waveform::Triangle,
        osc3_mode: ModulationMode::Fm1,
        osc3_amp: 0.5,
        ..Controls::default()
    };

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Held note, no events in the measured blocks
        let Ok(mut engine) = VibratoEngine::new(SAMPLE_RATE) else {
            return;
        };
        engine.set_controls(controls);
        engine.note_on(60);
        group.bench_with_input(BenchmarkId::new("held_note", size), &size, |b, _| {
            b.iter(|| {
                engine.process_block(
                    [black_box(input.as_slice()), black_box(input.as_slice())],
                    [&mut left[..], &mut right[..]],
                    &[],
                );
            })
        });

        // Retrigger in the middle of every block (segmentation overhead)
        let events = [
            TimedEvent::new(
                size / 2,
                MidiEvent::NoteOn {
                    channel: 0,
                    key: 60,
                    velocity: 100,
                },
            ),
        ];
        let Ok(mut engine) = VibratoEngine::new(SAMPLE_RATE) else {
            return;
        };
        engine.set_controls(controls);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                engine.process_block(
                    [black_box(input.as_slice()), black_box(input.as_slice())],
                    [&mut left[..], &mut right[..]],
                    black_box(&events),
                );
            })
        });
    }

    group.finish();
}
