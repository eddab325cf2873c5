//! Benchmarks for the three-oscillator modulation router.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibrato_dsp::dsp::lfo::Waveform;
use vibrato_dsp::engine::router::{ModulationMode, ModulationRouter, SourceMode};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn router(osc2: ModulationMode, osc3: ModulationMode) -> ModulationRouter {
    let mut router = ModulationRouter::new();
    for (osc, waveform) in router
        .oscillators_mut()
        .into_iter()
        .zip([Waveform::Sine, Waveform::Triangle, Waveform::Square])
    {
        osc.set_waveform(waveform);
    }
    router.set_osc1(SourceMode::Lfo, 5.0);
    router.set_osc2(osc2, 0.5, 0.7);
    router.set_osc3(osc3, 0.3, 0.2);
    router.start();
    router
}

pub fn bench_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/router");
    let dt = 1.0 / SAMPLE_RATE;

    let routings = [
        ("osc1_only", ModulationMode::Off, ModulationMode::Off),
        ("all_add", ModulationMode::Add, ModulationMode::Add),
        ("fm_chain", ModulationMode::Fm1, ModulationMode::Fm2),
        ("pm_am", ModulationMode::Pm1, ModulationMode::Am2),
    ];

    for &size in BLOCK_SIZES {
        for (name, osc2, osc3) in routings {
            let mut router = router(osc2, osc3);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for _ in 0..size {
                        let m = router.next(black_box(dt), SAMPLE_RATE);
                        sum += m.signal + m.integral;
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
