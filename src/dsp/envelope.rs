//! Attack/decay/sustain/release depth envelope.

use std::f64::consts::FRAC_PI_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::observer::{Callback, EventKind, Observers};
use crate::error::Result;

/*
ADSR Depth Envelope
===================

This envelope does not gate audio. It scales how deep the vibrato/tremolo
modulation is over the life of a note: a note starts dry, the wobble fades
in, settles, and fades out again after note-off.

Vocabulary
----------

  value       The envelope's current output (0.0 to 1.0). Multiplies the
              routed modulation signal and its integral.

  phase       Attack, Decay, Sustain or Release.

  phase_time  Seconds elapsed inside the current phase. Unlike a per-sample
              increment this is a TIME, so `run()` can be called with any
              step: one sample, a whole block, or zero.

  duration    Length of a phase in seconds (sustain has none, its parameter
              is a LEVEL).

  shape       The fader curve applied to the normalized position inside a
              phase.


The Shape
---------

Each timed phase interpolates between two boundary values:

    Attack    0       → 1
    Decay     1       → sustain
    Release   sustain → 0

with x = phase_time / duration and

    value = prev + (next - prev) · shape(x)

    LINEAR        shape(x) = x
    INV_SQUARE    shape(x) = 1 - (1 - x)²      fast start, soft landing
    SQUARE_ROOT   shape(x) = sqrt(|x|)         even faster start
    QUARTER_SINE  shape(x) = sin(π/2 · x)


Time, Not Samples
-----------------

`run(dt)` adds dt to phase_time and then walks over every boundary that has
been passed:

    while phase elapsed and phase != Sustain:
        Release → stop, done
        else    → phase_time -= duration, next phase

A single call can therefore skip several phases. With A = D = 0, `start()`
lands straight in Sustain.


Early Release
-------------

`release()` computes

    phase_time = (sustain - value) · release_duration

If the note is released before the envelope has settled, with the value
still above sustain, that is a NEGATIVE time: the release "starts before its
own beginning" and the curve runs through the part above sustain first.
SQUARE_ROOT takes the absolute value so it stays defined there.

A release only counts as finished once some time has actually passed in it.
With a zero-length release the envelope holds its start value until the next
non-zero `run()`.


Editing a Running Phase
-----------------------

Changing the duration of the phase that is currently running must not make
the value jump. The current value is turned back into a normalized position
(inverse of the fader curve) and phase_time is recomputed for the new
duration:

    Attack   position = value
    Decay    position = (1 - value) / (1 - sustain)     skipped if sustain = 1
    Release  position = (sustain - value) / sustain     skipped if sustain = 0

Editing any other phase leaves the current value alone.
*/

/// Envelope phase. `Sustain` is the only one without a duration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl EnvelopePhase {
    fn next(self) -> Self {
        match self {
            EnvelopePhase::Attack => EnvelopePhase::Decay,
            EnvelopePhase::Decay => EnvelopePhase::Sustain,
            EnvelopePhase::Sustain | EnvelopePhase::Release => EnvelopePhase::Release,
        }
    }
}

/// Fader curve applied within Attack, Decay and Release.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaderShape {
    #[default]
    Linear,
    InvSquare,
    SquareRoot,
    QuarterSine,
}

impl FaderShape {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            FaderShape::Linear => x,
            FaderShape::InvSquare => 1.0 - (1.0 - x) * (1.0 - x),
            FaderShape::SquareRoot => x.abs().sqrt(),
            FaderShape::QuarterSine => (FRAC_PI_2 * x).sin(),
        }
    }

    /// Position `x` for which `apply(x) == y`, on the rising branch.
    pub fn inverse(self, y: f64) -> f64 {
        match self {
            FaderShape::Linear => y,
            FaderShape::InvSquare => 1.0 - (1.0 - y).max(0.0).sqrt(),
            FaderShape::SquareRoot => y * y,
            FaderShape::QuarterSine => y.clamp(-1.0, 1.0).asin() / FRAC_PI_2,
        }
    }
}

/// Envelope state transitions a caller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeEvent {
    Start,
    /// A phase boundary was crossed (including the jump into Release).
    Phase,
    Stop,
}

impl EventKind for EnvelopeEvent {
    const NAME: &'static str = "envelope";

    fn slot(self) -> usize {
        match self {
            EnvelopeEvent::Start => 0,
            EnvelopeEvent::Phase => 1,
            EnvelopeEvent::Stop => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack: f64,  // seconds 0 → 1
    decay: f64,   // seconds 1 → sustain
    sustain: f64, // level
    release: f64, // seconds sustain → 0

    shape: FaderShape,
    phase: EnvelopePhase,
    phase_time: f64, // may be negative after an early release
    active: bool,

    observers: Observers<Envelope>,
}

impl Envelope {
    /// A = 0, D = 0, S = 1, R = 0 with a linear fader.
    pub fn new() -> Self {
        Self::adsr(0.0, 0.0, 1.0, 0.0)
    }

    /// Parameters are not validated.
    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            shape: FaderShape::Linear,
            phase: EnvelopePhase::Attack,
            phase_time: 0.0,
            active: false,
            observers: Observers::new(),
        }
    }

    pub fn with_shape(mut self, shape: FaderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn set_shape(&mut self, shape: FaderShape) {
        self.shape = shape;
    }

    pub fn shape(&self) -> FaderShape {
        self.shape
    }

    /// Replace all four parameters. Not validated.
    pub fn set_parameters(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.attack = attack;
        self.decay = decay;
        self.sustain = sustain;
        self.release = release;
        self.run(0.0);
    }

    /// Replace a single parameter, keeping the current value continuous when
    /// the running phase's duration changes. Not validated.
    pub fn set_parameter(&mut self, phase: EnvelopePhase, value: f64) {
        if self.active && phase == self.phase {
            let current = self.value();
            let position = match phase {
                EnvelopePhase::Attack => Some(current),
                EnvelopePhase::Decay if self.sustain != 1.0 => {
                    Some((1.0 - current) / (1.0 - self.sustain))
                }
                EnvelopePhase::Release if self.sustain != 0.0 => {
                    Some((self.sustain - current) / self.sustain)
                }
                _ => None,
            };

            if let Some(position) = position {
                self.phase_time = value * self.shape.inverse(position);
            }
        }

        match phase {
            EnvelopePhase::Attack => self.attack = value,
            EnvelopePhase::Decay => self.decay = value,
            EnvelopePhase::Sustain => self.sustain = value,
            EnvelopePhase::Release => self.release = value,
        }
        self.run(0.0);
    }

    /// Duration for A/D/R, level for S.
    pub fn parameter(&self, phase: EnvelopePhase) -> f64 {
        match phase {
            EnvelopePhase::Attack => self.attack,
            EnvelopePhase::Decay => self.decay,
            EnvelopePhase::Sustain => self.sustain,
            EnvelopePhase::Release => self.release,
        }
    }

    /// Current envelope value. 0 when inactive.
    pub fn value(&self) -> f64 {
        if !self.active {
            return 0.0;
        }

        let (prev, next) = match self.phase {
            EnvelopePhase::Sustain => return self.sustain,
            EnvelopePhase::Attack => (0.0, 1.0),
            EnvelopePhase::Decay => (1.0, self.sustain),
            EnvelopePhase::Release => (self.sustain, 0.0),
        };

        let duration = self.parameter(self.phase);
        let x = if duration != 0.0 {
            self.phase_time / duration
        } else {
            0.0
        };

        prev + (next - prev) * self.shape.apply(x)
    }

    /// Gate on: restart from the beginning of the attack.
    pub fn start(&mut self) {
        self.active = true;
        self.phase = EnvelopePhase::Attack;
        self.phase_time = 0.0;
        self.notify(EnvelopeEvent::Start);
        self.run(0.0);
    }

    /// Advance by `dt` seconds, crossing as many phase boundaries as needed.
    pub fn run(&mut self, dt: f64) {
        if !self.active {
            return;
        }

        self.phase_time += dt;
        while self.phase_elapsed() {
            if self.phase == EnvelopePhase::Release {
                self.stop();
                return;
            }

            self.phase_time -= self.parameter(self.phase);
            self.phase = self.phase.next();
            self.notify(EnvelopeEvent::Phase);
        }
    }

    /// Gate off: jump to Release, starting from the current value.
    pub fn release(&mut self) {
        if !self.active {
            return;
        }

        // Negative when released before reaching the sustain level
        self.phase_time = (self.sustain - self.value()) * self.release;
        self.phase = EnvelopePhase::Release;
        self.notify(EnvelopeEvent::Phase);
        self.run(0.0);
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.notify(EnvelopeEvent::Stop);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    pub fn phase_time(&self) -> f64 {
        self.phase_time
    }

    /// Register a callback for `event`. `context` is handed back verbatim.
    pub fn subscribe(
        &mut self,
        event: EnvelopeEvent,
        callback: Callback<Envelope>,
        context: usize,
    ) -> Result<usize> {
        self.observers.subscribe(event, callback, context)
    }

    pub fn unsubscribe(&mut self, event: EnvelopeEvent, slot: usize) -> bool {
        self.observers.unsubscribe(event, slot).is_some()
    }

    fn phase_elapsed(&self) -> bool {
        let duration = self.parameter(self.phase);
        match self.phase {
            EnvelopePhase::Sustain => false,
            EnvelopePhase::Release => self.phase_time >= duration && self.phase_time > 0.0,
            EnvelopePhase::Attack | EnvelopePhase::Decay => self.phase_time >= duration,
        }
    }

    #[inline]
    fn notify(&self, event: EnvelopeEvent) {
        self.observers.notify(event, self);
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
