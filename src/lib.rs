pub mod dsp; // Envelope, LFO, faders, history buffer
pub mod engine; // Modulation routing and the per-sample engine
pub mod error;
pub mod io; // Controllers, MIDI and host glue

pub use engine::VibratoEngine;
pub use error::{Error, Result};

/// Samples of history kept per channel.
pub const HISTORY_CAPACITY: usize = 0x10000;

/// Frequency ratio of one equal-tempered semitone, 2^(1/12).
pub const SEMITONE_RATIO: f64 = 1.059_463_094_359_295_3;

/// Largest block the demo binary and benches hand to the engine at once.
pub const MAX_BLOCK_SIZE: usize = 2048;
