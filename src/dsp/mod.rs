//! Low-level DSP primitives the engine is assembled from.
//!
//! These components are allocation-free after construction and realtime-safe.
//! Envelopes and oscillators can also be instantiated on their own, e.g. on a
//! control thread to preview a curve.

/// History ring buffer read at a sample offset.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Slew-limited parameter smoothing.
pub mod fader;
/// Low frequency oscillators with closed-form integrals.
pub mod lfo;
/// Dry/wet crossfade.
pub mod mix;
/// Fixed-slot event subscription.
pub mod observer;

pub use delay::HistoryBuffer;
pub use envelope::{Envelope, EnvelopeEvent, EnvelopePhase, FaderShape};
pub use fader::DeclickFader;
pub use lfo::{Oscillator, OscillatorEvent, Waveform};
