//! Three-oscillator modulation routing.

use std::ops::{AddAssign, DivAssign, MulAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::{bipolar_to_unipolar, Oscillator};

/*
Modulation Routing
==================

Three LFOs feed one vibrato/tremolo source. osc1 is the carrier; osc2 and
osc3 either add to the output or modulate an oscillator further up the
chain. Each sample runs the chain bottom up:

    osc3 ──┬── ADD ────────────────────────────────┐
           ├── FM/PM/AM ─→ osc2                    │
           └── FM/PM/AM ─→ osc1                    │
                                                   ▼
    osc2 ──┬── ADD ──────────────────────────────→ Σ ─→ ÷ norm ─→ (signal, integral)
           └── FM/PM/AM ─→ osc1                    ▲
                                                   │
    osc1 ──────────────────────────────────────────┘

Modes (a = amplitude, v = oscillator value in [-1, 1]):

  ADD   signal   += a·v
        integral += a·∫v · rate / f      (integral expressed in samples)

  FM    target frequency  ×= 1 - a·v
  PM    target phase shift += a·v      (in cycles, not accumulated)
  AM    target amplitude  ×= 1 - a·(1 + v)/2

"1" modes target osc1, "2" modes target osc2. osc2 cannot modulate itself, so
its "2" modes are silently ignored.

Normalisation
-------------

Every oscillator in ADD mode contributes up to its amplitude, osc1 up to 1.
Both outputs are divided by 1 + a2 + a3 (only counting the ADD oscillators)
so the sum stays within [-1, 1].

A zero frequency on an ADD oscillator divides by zero and yields a non-finite
integral. That propagates into the delay read, which saturates instead of
panicking.
*/

/// How osc2 or osc3 feeds the chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationMode {
    #[default]
    Off,
    Add,
    Fm1,
    Pm1,
    Am1,
    Fm2,
    Pm2,
    Am2,
}

/// Whether osc1 runs as an LFO or is left to user automation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    Lfo,
    /// osc1 is not advanced and contributes nothing.
    User,
}

/// One sample of routed modulation: the value for tremolo and the integral
/// (in samples) for vibrato.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modulation {
    pub signal: f64,
    pub integral: f64,
}

impl AddAssign for Modulation {
    fn add_assign(&mut self, rhs: Self) {
        self.signal += rhs.signal;
        self.integral += rhs.integral;
    }
}

impl MulAssign<f64> for Modulation {
    fn mul_assign(&mut self, rhs: f64) {
        self.signal *= rhs;
        self.integral *= rhs;
    }
}

impl DivAssign<f64> for Modulation {
    fn div_assign(&mut self, rhs: f64) {
        self.signal /= rhs;
        self.integral /= rhs;
    }
}

/// Per-sample multipliers and offsets one oscillator applies to another.
#[derive(Debug, Clone, Copy)]
struct Modulators {
    frequency: f64,
    phase: f64,
    amplitude: f64,
}

impl Default for Modulators {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            phase: 0.0,
            amplitude: 1.0,
        }
    }
}

impl Modulators {
    fn apply(&mut self, kind: Target, amplitude: f64, value: f64) {
        match kind {
            Target::Frequency => self.frequency *= 1.0 - amplitude * value,
            Target::Phase => self.phase += amplitude * value,
            Target::Amplitude => self.amplitude *= 1.0 - amplitude * bipolar_to_unipolar(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Frequency,
    Phase,
    Amplitude,
}

#[derive(Debug, Clone)]
pub struct ModulationRouter {
    osc1: Oscillator,
    osc2: Oscillator,
    osc3: Oscillator,

    osc1_mode: SourceMode,
    osc1_freq: f64,

    osc2_mode: ModulationMode,
    osc2_amp: f64,
    osc2_freq: f64,

    osc3_mode: ModulationMode,
    osc3_amp: f64,
    osc3_freq: f64,
}

impl ModulationRouter {
    /// osc1 as a 1 Hz sine LFO, osc2 and osc3 off.
    pub fn new() -> Self {
        Self {
            osc1: Oscillator::sine(1.0),
            osc2: Oscillator::sine(1.0),
            osc3: Oscillator::sine(1.0),
            osc1_mode: SourceMode::Lfo,
            osc1_freq: 1.0,
            osc2_mode: ModulationMode::Off,
            osc2_amp: 0.0,
            osc2_freq: 1.0,
            osc3_mode: ModulationMode::Off,
            osc3_amp: 0.0,
            osc3_freq: 1.0,
        }
    }

    pub fn set_osc1(&mut self, mode: SourceMode, frequency: f64) {
        self.osc1_mode = mode;
        self.osc1_freq = frequency;
    }

    pub fn set_osc2(&mut self, mode: ModulationMode, amplitude: f64, frequency: f64) {
        self.osc2_mode = mode;
        self.osc2_amp = amplitude;
        self.osc2_freq = frequency;
    }

    pub fn set_osc3(&mut self, mode: ModulationMode, amplitude: f64, frequency: f64) {
        self.osc3_mode = mode;
        self.osc3_amp = amplitude;
        self.osc3_freq = frequency;
    }

    pub fn osc1(&self) -> &Oscillator {
        &self.osc1
    }

    pub fn osc2(&self) -> &Oscillator {
        &self.osc2
    }

    pub fn osc3(&self) -> &Oscillator {
        &self.osc3
    }

    /// Mutable access in chain order: osc1, osc2, osc3.
    pub fn oscillators_mut(&mut self) -> [&mut Oscillator; 3] {
        [&mut self.osc1, &mut self.osc2, &mut self.osc3]
    }

    /// Load the configured base frequencies and restart all three cycles.
    pub fn start(&mut self) {
        self.osc1.set_frequency(self.osc1_freq);
        self.osc2.set_frequency(self.osc2_freq);
        self.osc3.set_frequency(self.osc3_freq);
        for osc in self.oscillators_mut() {
            osc.start();
        }
    }

    pub fn stop(&mut self) {
        for osc in self.oscillators_mut() {
            osc.stop();
        }
    }

    /// Advance every oscillator by one sample and return the routed output.
    pub fn next(&mut self, sample_time: f64, rate: f64) -> Modulation {
        let mut out = Modulation::default();
        let mut mod1 = Modulators::default();
        let mut mod2 = Modulators::default();

        self.osc3.set_frequency(self.osc3_freq);
        self.osc3.run(sample_time);
        let value = self.osc3.value();
        let amp = self.osc3_amp;
        match self.osc3_mode {
            ModulationMode::Off => {}
            ModulationMode::Add => {
                out += Modulation {
                    signal: amp * value,
                    integral: amp * self.osc3.integral() * rate / self.osc3_freq,
                };
            }
            ModulationMode::Fm1 => mod1.apply(Target::Frequency, amp, value),
            ModulationMode::Pm1 => mod1.apply(Target::Phase, amp, value),
            ModulationMode::Am1 => mod1.apply(Target::Amplitude, amp, value),
            ModulationMode::Fm2 => mod2.apply(Target::Frequency, amp, value),
            ModulationMode::Pm2 => mod2.apply(Target::Phase, amp, value),
            ModulationMode::Am2 => mod2.apply(Target::Amplitude, amp, value),
        }

        self.osc2.set_frequency(mod2.frequency * self.osc2_freq);
        self.osc2.set_phase_shift(mod2.phase);
        self.osc2.run(sample_time);
        let value = self.osc2.value();
        let amp = mod2.amplitude * self.osc2_amp;
        match self.osc2_mode {
            ModulationMode::Add => {
                out += Modulation {
                    signal: amp * value,
                    integral: amp * self.osc2.integral() * rate / self.osc2_freq,
                };
            }
            ModulationMode::Fm1 => mod1.apply(Target::Frequency, amp, value),
            ModulationMode::Pm1 => mod1.apply(Target::Phase, amp, value),
            ModulationMode::Am1 => mod1.apply(Target::Amplitude, amp, value),
            ModulationMode::Off | ModulationMode::Fm2 | ModulationMode::Pm2 | ModulationMode::Am2 => {}
        }

        if self.osc1_mode == SourceMode::Lfo {
            self.osc1.set_frequency(mod1.frequency * self.osc1_freq);
            self.osc1.set_phase_shift(mod1.phase);
            self.osc1.run(sample_time);
            out += Modulation {
                signal: mod1.amplitude * self.osc1.value(),
                integral: mod1.amplitude * self.osc1.integral() * rate / self.osc1_freq,
            };
        }

        out /= self.normalisation();
        out
    }

    /// 1 plus the amplitude of every oscillator in ADD mode.
    fn normalisation(&self) -> f64 {
        let mut norm = 1.0;
        if self.osc2_mode == ModulationMode::Add {
            norm += self.osc2_amp;
        }
        if self.osc3_mode == ModulationMode::Add {
            norm += self.osc3_amp;
        }
        norm
    }
}

impl Default for ModulationRouter {
    fn default() -> Self {
        Self::new()
    }
}
