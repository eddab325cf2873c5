//! Low Frequency Oscillator (LFO) with a closed-form integral.

use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::observer::{Callback, EventKind, Observers};
use crate::error::Result;

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at control rate (~0.1 Hz to ~20 Hz). Here
it drives two things at once:

  tremolo   uses the LFO VALUE directly as a gain wobble
  vibrato   uses the LFO INTEGRAL as a time shift of the audio

Vocabulary
----------

  phase         Position in the current cycle, kept in [0, 1).
                Advances by dt · frequency on each `run(dt)`.

  phase shift   An offset added to the phase before the waveform is looked
                up. It is NOT accumulated into the phase, so a phase
                modulator can push the lookup around without the oscillator
                drifting. Any real value.

  boundary      The instant the shifted phase (phase + shift) crosses an
                integer. This is where one cycle ends and the next begins.

  bipolar       Output in [-1, +1]. All three waveforms are bipolar.


Waveforms
---------

With x = frac(phase + shift):

SINE       -cos(2πx)      starts at -1, rises through 0 at x = 0.25

TRIANGLE   0 → +1 → -1 → 0

               ╱╲
           ───╱──╲──────╱───
                  ╲    ╱
                   ╲╱
           0   .25  .5  .75  1

SQUARE     +1 on [0, .25) and [.75, 1), -1 on [.25, .75)


Why an Integral?
----------------

Vibrato bends pitch. Pitch is the rate at which we walk through the input,
so to bend pitch by an LFO we have to shift the read position by the
INTEGRAL of that LFO. Summing the LFO sample by sample would drift; instead
each waveform carries its antiderivative in closed form:

  SINE      sin(2πx)
  TRIANGLE  piecewise quadratic, one parabola per quarter cycle
  SQUARE    the triangle shape (a square wave integrates to a triangle)


Deferred Waveform Changes
-------------------------

Switching waveform mid-cycle would make the value jump (sine at x = 0.5 is
+1, square there is -1): an audible click. `set_waveform` only SCHEDULES the
change. It is applied when the shifted phase next crosses a boundary, or
immediately if the shifted phase is exactly on one right now.
*/

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
///
/// # Example
/// ```
/// use vibrato_dsp::dsp::lfo::bipolar_to_unipolar;
/// assert_eq!(bipolar_to_unipolar(-1.0), 0.0);
/// assert_eq!(bipolar_to_unipolar(0.0), 0.5);
/// ```
#[inline]
pub fn bipolar_to_unipolar(bipolar: f64) -> f64 {
    (bipolar + 1.0) * 0.5
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    /// Waveform value at cycle position `x` in [0, 1).
    #[inline]
    pub fn value(self, x: f64) -> f64 {
        match self {
            Waveform::Sine => -(TAU * x).cos(),
            Waveform::Triangle => triangle(x),
            Waveform::Square => {
                if !(0.25..0.75).contains(&x) {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Closed-form integral at cycle position `x` in [0, 1).
    #[inline]
    pub fn integral(self, x: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * x).sin(),
            Waveform::Triangle => {
                let quarter = (4.0 * x).floor();
                let r = 4.0 * x - quarter;
                match quarter as i32 {
                    0 => 0.5 * r * r,
                    1 => 0.5 + r - 0.5 * r * r,
                    2 => 1.0 - 0.5 * r * r,
                    _ => 0.5 - r + 0.5 * r * r,
                }
            }
            Waveform::Square => triangle(x),
        }
    }
}

#[inline]
fn triangle(x: f64) -> f64 {
    if x < 0.25 {
        4.0 * x
    } else if x < 0.75 {
        1.0 - 4.0 * (x - 0.25)
    } else {
        -1.0 + 4.0 * (x - 0.75)
    }
}

/// Oscillator state transitions a caller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorEvent {
    Start,
    /// The shifted phase crossed a cycle boundary.
    PhaseRestart,
    Stop,
}

impl EventKind for OscillatorEvent {
    const NAME: &'static str = "oscillator";

    fn slot(self) -> usize {
        match self {
            OscillatorEvent::Start => 0,
            OscillatorEvent::PhaseRestart => 1,
            OscillatorEvent::Stop => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    scheduled_waveform: Waveform,
    frequency: f64, // cycles per second
    phase: f64,     // [0, 1)
    phase_shift: f64,
    active: bool,

    observers: Observers<Oscillator>,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64) -> Self {
        Self {
            waveform,
            scheduled_waveform: waveform,
            frequency,
            phase: 0.0,
            phase_shift: 0.0,
            active: false,
            observers: Observers::new(),
        }
    }

    pub fn sine(frequency: f64) -> Self {
        Self::new(Waveform::Sine, frequency)
    }

    pub fn triangle(frequency: f64) -> Self {
        Self::new(Waveform::Triangle, frequency)
    }

    pub fn square(frequency: f64) -> Self {
        Self::new(Waveform::Square, frequency)
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Schedule a waveform change for the next cycle boundary. Applied
    /// immediately when the shifted phase sits exactly on a boundary.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.scheduled_waveform = waveform;
        if self.position() == 0.0 {
            self.waveform = waveform;
        }
    }

    /// The waveform currently sounding.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn scheduled_waveform(&self) -> Waveform {
        self.scheduled_waveform
    }

    /// Offset in cycles; 1.0 is a full cycle.
    pub fn set_phase_shift(&mut self, shift: f64) {
        self.phase_shift = shift;
    }

    pub fn phase_shift(&self) -> f64 {
        self.phase_shift
    }

    /// Unshifted phase accumulator in [0, 1).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Restart the cycle and apply any scheduled waveform.
    pub fn start(&mut self) {
        self.phase = 0.0;
        self.waveform = self.scheduled_waveform;
        self.active = true;
        self.notify(OscillatorEvent::Start);
    }

    pub fn stop(&mut self) {
        self.phase = 0.0;
        self.waveform = self.scheduled_waveform;
        self.active = false;
        self.notify(OscillatorEvent::Stop);
    }

    /// Advance by `dt` seconds.
    pub fn run(&mut self, dt: f64) {
        if !self.active {
            return;
        }

        let delta = dt * self.frequency;
        let shifted = self.phase + self.phase_shift;
        if (shifted + delta).floor() != shifted.floor() {
            self.waveform = self.scheduled_waveform;
            self.notify(OscillatorEvent::PhaseRestart);
        }

        // rem_euclid keeps a negative frequency (deep FM) inside [0, 1) too;
        // it can round a tiny negative up to exactly 1.0
        self.phase = (self.phase + delta).rem_euclid(1.0);
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.waveform.value(self.position())
    }

    #[inline]
    pub fn integral(&self) -> f64 {
        self.waveform.integral(self.position())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Register a callback for `event`. `context` is handed back verbatim.
    pub fn subscribe(
        &mut self,
        event: OscillatorEvent,
        callback: Callback<Oscillator>,
        context: usize,
    ) -> Result<usize> {
        self.observers.subscribe(event, callback, context)
    }

    pub fn unsubscribe(&mut self, event: OscillatorEvent, slot: usize) -> bool {
        self.observers.unsubscribe(event, slot).is_some()
    }

    /// frac(phase + shift), always in [0, 1)
    #[inline]
    fn position(&self) -> f64 {
        let x = (self.phase + self.phase_shift).rem_euclid(1.0);
        if x >= 1.0 {
            0.0
        } else {
            x
        }
    }

    #[inline]
    fn notify(&self, event: OscillatorEvent) {
        self.observers.notify(event, self);
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::sine(1.0)
    }
}
