//! Error types for vibrato_dsp.
//!
//! Nothing on the per-sample path returns an error. These only surface while
//! constructing an engine, decoding controller values or wiring observers.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid sample rate: {0} (must be finite and positive)")]
    InvalidSampleRate(f64),

    #[error("history buffer too small: base offset needs {required} samples, capacity is {capacity}")]
    HistoryTooSmall { required: usize, capacity: usize },

    #[error("unknown {kind} selector: {value}")]
    UnknownSelector { kind: &'static str, value: f32 },

    #[error("all {0} subscriber slots are taken")]
    SubscribersFull(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
