//! Benchmarks for low-level DSP primitives.

mod delay;
mod envelope;
mod lfo;

pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use lfo::bench_lfo;
