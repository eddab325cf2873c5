//! Real-world scenario benchmarks.
//!
//! These benchmarks model actual usage patterns: a fully routed LFO bank and
//! the stereo engine processing blocks with a held note.

mod engine;
mod router;

pub use engine::bench_engine;
pub use router::bench_router;
