//! Controller table: raw host floats → validated, typed [`Controls`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::Waveform;
use crate::engine::router::{ModulationMode, SourceMode};
use crate::error::{Error, Result};

/*
Controllers
===========

The host hands over a flat array of floats, one per controller, in this
order. Every value is first clamped and quantised by its `Limit`, then
decoded into a typed field.

  idx  controller      min   max    step   decoded as
  ───  ──────────────  ────  ─────  ────   ─────────────────────────────
   0   bypass          0     1      1      bool
   1   dry/wet         0     1      -      f32
   2   MIDI channels   0     65535  1      u16 bitmask, bit n = channel n
   3   MIDI note       0     128    1      NoteFilter (128 = any)
   4   depth CC        0     128    1      DepthSource (128 = dial)
   5   depth           0     50     -      cents
   6   attack          0.1   4      -      seconds
   7   decay           0.1   4      -      seconds
   8   sustain         0     1      -      level
   9   release         0.1   4      -      seconds
  10   osc1 freq       1     20     -      Hz
  11   osc1 mode       1     2      1      SourceMode
  12   osc1 waveform   1     3      1      Waveform
  13   osc2 amp        0     1      -
  14   osc2 freq       0.1   20     -      Hz
  15   osc2 mode       1     5      1      ModulationMode (Off..Am1)
  16   osc2 waveform   1     3      1      Waveform
  17   osc3 amp        0     10     -
  18   osc3 freq       0.1   20     -      Hz
  19   osc3 mode       1     8      1      ModulationMode
  20   osc3 waveform   1     3      1      Waveform
  21   tremolo         0     0.5    -

A step of 0 means continuous.
*/

pub const BYPASS: usize = 0;
pub const DRY_WET: usize = 1;
pub const MIDI_CHANNELS: usize = 2;
pub const MIDI_NOTE: usize = 3;
pub const DEPTH_CC: usize = 4;
pub const DEPTH: usize = 5;
pub const ATTACK: usize = 6;
pub const DECAY: usize = 7;
pub const SUSTAIN: usize = 8;
pub const RELEASE: usize = 9;
pub const OSC1_FREQ: usize = 10;
pub const OSC1_MODE: usize = 11;
pub const OSC1_WAVEFORM: usize = 12;
pub const OSC2_AMP: usize = 13;
pub const OSC2_FREQ: usize = 14;
pub const OSC2_MODE: usize = 15;
pub const OSC2_WAVEFORM: usize = 16;
pub const OSC3_AMP: usize = 17;
pub const OSC3_FREQ: usize = 18;
pub const OSC3_MODE: usize = 19;
pub const OSC3_WAVEFORM: usize = 20;
pub const TREMOLO: usize = 21;

pub const CONTROLLER_COUNT: usize = 22;

/// Selector value meaning "any note" / "use the depth dial".
pub const SELECTOR_ANY: u8 = 128;

/// Range and quantisation of one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Limit {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamp into `[min, max]` and snap to the step grid anchored at `min`
    /// (or at `max` for a negative step). NaN maps to `min`.
    ///
    /// ```
    /// use vibrato_dsp::io::params::Limit;
    /// let mode = Limit::new(1.0, 8.0, 1.0);
    /// assert_eq!(mode.validate(3.4), 3.0);
    /// assert_eq!(mode.validate(99.0), 8.0);
    /// ```
    pub fn validate(&self, value: f32) -> f32 {
        if self.max <= self.min || value <= self.min || value.is_nan() {
            return self.min;
        }
        if value >= self.max {
            return self.max;
        }
        if self.step == 0.0 {
            return value;
        }

        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            self.max - ((self.max - value) / self.step).round() * self.step
        };
        snapped.clamp(self.min, self.max)
    }
}

pub const LIMITS: [Limit; CONTROLLER_COUNT] = [
    Limit::new(0.0, 1.0, 1.0),
    Limit::new(0.0, 1.0, 0.0),
    Limit::new(0.0, 65535.0, 1.0),
    Limit::new(0.0, 128.0, 1.0),
    Limit::new(0.0, 128.0, 1.0),
    Limit::new(0.0, 50.0, 0.0),
    Limit::new(0.1, 4.0, 0.0),
    Limit::new(0.1, 4.0, 0.0),
    Limit::new(0.0, 1.0, 0.0),
    Limit::new(0.1, 4.0, 0.0),
    Limit::new(1.0, 20.0, 0.0),
    Limit::new(1.0, 2.0, 1.0),
    Limit::new(1.0, 3.0, 1.0),
    Limit::new(0.0, 1.0, 0.0),
    Limit::new(0.1, 20.0, 0.0),
    Limit::new(1.0, 5.0, 1.0),
    Limit::new(1.0, 3.0, 1.0),
    Limit::new(0.0, 10.0, 0.0),
    Limit::new(0.1, 20.0, 0.0),
    Limit::new(1.0, 8.0, 1.0),
    Limit::new(1.0, 3.0, 1.0),
    Limit::new(0.0, 0.5, 0.0),
];

/// Which note keys the effect.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    #[default]
    Any,
    Key(u8),
}

impl NoteFilter {
    pub fn matches(self, key: u8) -> bool {
        match self {
            NoteFilter::Any => true,
            NoteFilter::Key(k) => k == key,
        }
    }
}

/// Where the vibrato depth comes from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthSource {
    /// The `depth_cents` controller.
    #[default]
    Dial,
    /// A MIDI CC number scaled onto the full depth range.
    Cc(u8),
}

/// A complete, validated controller set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub bypass: bool,
    pub dry_wet: f32,
    /// Bit n enables MIDI channel n.
    pub midi_channels: u16,
    pub midi_note: NoteFilter,
    pub depth_source: DepthSource,
    pub depth_cents: f32,

    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,

    pub osc1_freq: f64,
    pub osc1_mode: SourceMode,
    pub osc1_waveform: Waveform,

    pub osc2_amp: f64,
    pub osc2_freq: f64,
    pub osc2_mode: ModulationMode,
    pub osc2_waveform: Waveform,

    pub osc3_amp: f64,
    pub osc3_freq: f64,
    pub osc3_mode: ModulationMode,
    pub osc3_waveform: Waveform,

    pub tremolo: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            bypass: false,
            dry_wet: 1.0,
            midi_channels: 0xFFFF,
            midi_note: NoteFilter::Any,
            depth_source: DepthSource::Dial,
            depth_cents: 20.0,
            attack: 0.25,
            decay: 0.25,
            sustain: 1.0,
            release: 0.5,
            osc1_freq: 5.0,
            osc1_mode: SourceMode::Lfo,
            osc1_waveform: Waveform::Sine,
            osc2_amp: 0.0,
            osc2_freq: 1.0,
            osc2_mode: ModulationMode::Off,
            osc2_waveform: Waveform::Sine,
            osc3_amp: 0.0,
            osc3_freq: 1.0,
            osc3_mode: ModulationMode::Off,
            osc3_waveform: Waveform::Sine,
            tremolo: 0.0,
        }
    }
}

impl Controls {
    /// Validate every controller against [`LIMITS`] and decode it.
    pub fn from_raw(raw: &[f32; CONTROLLER_COUNT]) -> Result<Self> {
        let v: [f32; CONTROLLER_COUNT] = std::array::from_fn(|i| LIMITS[i].validate(raw[i]));

        Ok(Self {
            bypass: v[BYPASS] != 0.0,
            dry_wet: v[DRY_WET],
            midi_channels: v[MIDI_CHANNELS] as u16,
            midi_note: note_filter(v[MIDI_NOTE]),
            depth_source: depth_source(v[DEPTH_CC]),
            depth_cents: v[DEPTH],
            attack: v[ATTACK] as f64,
            decay: v[DECAY] as f64,
            sustain: v[SUSTAIN] as f64,
            release: v[RELEASE] as f64,
            osc1_freq: v[OSC1_FREQ] as f64,
            osc1_mode: source_mode(v[OSC1_MODE])?,
            osc1_waveform: waveform(v[OSC1_WAVEFORM])?,
            osc2_amp: v[OSC2_AMP] as f64,
            osc2_freq: v[OSC2_FREQ] as f64,
            osc2_mode: modulation_mode(v[OSC2_MODE])?,
            osc2_waveform: waveform(v[OSC2_WAVEFORM])?,
            osc3_amp: v[OSC3_AMP] as f64,
            osc3_freq: v[OSC3_FREQ] as f64,
            osc3_mode: modulation_mode(v[OSC3_MODE])?,
            osc3_waveform: waveform(v[OSC3_WAVEFORM])?,
            tremolo: v[TREMOLO],
        })
    }

    /// Inverse of [`Controls::from_raw`].
    pub fn to_raw(&self) -> [f32; CONTROLLER_COUNT] {
        let mut raw = [0.0; CONTROLLER_COUNT];
        raw[BYPASS] = if self.bypass { 1.0 } else { 0.0 };
        raw[DRY_WET] = self.dry_wet;
        raw[MIDI_CHANNELS] = self.midi_channels as f32;
        raw[MIDI_NOTE] = match self.midi_note {
            NoteFilter::Any => SELECTOR_ANY as f32,
            NoteFilter::Key(key) => key as f32,
        };
        raw[DEPTH_CC] = match self.depth_source {
            DepthSource::Dial => SELECTOR_ANY as f32,
            DepthSource::Cc(cc) => cc as f32,
        };
        raw[DEPTH] = self.depth_cents;
        raw[ATTACK] = self.attack as f32;
        raw[DECAY] = self.decay as f32;
        raw[SUSTAIN] = self.sustain as f32;
        raw[RELEASE] = self.release as f32;
        raw[OSC1_FREQ] = self.osc1_freq as f32;
        raw[OSC1_MODE] = match self.osc1_mode {
            SourceMode::Lfo => 1.0,
            SourceMode::User => 2.0,
        };
        raw[OSC1_WAVEFORM] = waveform_selector(self.osc1_waveform);
        raw[OSC2_AMP] = self.osc2_amp as f32;
        raw[OSC2_FREQ] = self.osc2_freq as f32;
        raw[OSC2_MODE] = modulation_selector(self.osc2_mode);
        raw[OSC2_WAVEFORM] = waveform_selector(self.osc2_waveform);
        raw[OSC3_AMP] = self.osc3_amp as f32;
        raw[OSC3_FREQ] = self.osc3_freq as f32;
        raw[OSC3_MODE] = modulation_selector(self.osc3_mode);
        raw[OSC3_WAVEFORM] = waveform_selector(self.osc3_waveform);
        raw[TREMOLO] = self.tremolo;
        raw
    }

    /// Vibrato depth multiplier for the dial, or for the last depth CC value
    /// in `0.0..=1.0`.
    pub fn depth(&self, depth_cc: f64) -> f64 {
        match self.depth_source {
            DepthSource::Dial => 0.01 * self.depth_cents as f64,
            DepthSource::Cc(_) => 0.01 * LIMITS[DEPTH].max as f64 * depth_cc,
        }
    }
}

fn note_filter(value: f32) -> NoteFilter {
    match value as u8 {
        SELECTOR_ANY => NoteFilter::Any,
        key => NoteFilter::Key(key),
    }
}

fn depth_source(value: f32) -> DepthSource {
    match value as u8 {
        SELECTOR_ANY => DepthSource::Dial,
        cc => DepthSource::Cc(cc),
    }
}

fn unknown(kind: &'static str, value: f32) -> Error {
    tracing::warn!(kind, value, "rejected controller selector");
    Error::UnknownSelector { kind, value }
}

pub fn source_mode(value: f32) -> Result<SourceMode> {
    match value as i32 {
        1 => Ok(SourceMode::Lfo),
        2 => Ok(SourceMode::User),
        _ => Err(unknown("source mode", value)),
    }
}

pub fn modulation_mode(value: f32) -> Result<ModulationMode> {
    match value as i32 {
        1 => Ok(ModulationMode::Off),
        2 => Ok(ModulationMode::Add),
        3 => Ok(ModulationMode::Fm1),
        4 => Ok(ModulationMode::Pm1),
        5 => Ok(ModulationMode::Am1),
        6 => Ok(ModulationMode::Fm2),
        7 => Ok(ModulationMode::Pm2),
        8 => Ok(ModulationMode::Am2),
        _ => Err(unknown("modulation mode", value)),
    }
}

pub fn waveform(value: f32) -> Result<Waveform> {
    match value as i32 {
        1 => Ok(Waveform::Sine),
        2 => Ok(Waveform::Triangle),
        3 => Ok(Waveform::Square),
        _ => Err(unknown("waveform", value)),
    }
}

fn modulation_selector(mode: ModulationMode) -> f32 {
    match mode {
        ModulationMode::Off => 1.0,
        ModulationMode::Add => 2.0,
        ModulationMode::Fm1 => 3.0,
        ModulationMode::Pm1 => 4.0,
        ModulationMode::Am1 => 5.0,
        ModulationMode::Fm2 => 6.0,
        ModulationMode::Pm2 => 7.0,
        ModulationMode::Am2 => 8.0,
    }
}

fn waveform_selector(waveform: Waveform) -> f32 {
    match waveform {
        Waveform::Sine => 1.0,
        Waveform::Triangle => 2.0,
        Waveform::Square => 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn validate_clamps_and_snaps() {
        let limit = Limit::new(0.1, 4.0, 0.0);
        assert_eq!(limit.validate(0.0), 0.1);
        assert_eq!(limit.validate(9.0), 4.0);
        assert_eq!(limit.validate(1.234), 1.234);

        let stepped = Limit::new(0.0, 65535.0, 1.0);
        assert_eq!(stepped.validate(3.6), 4.0);
        assert_eq!(stepped.validate(f32::NAN), 0.0);
    }

    #[test]
    fn negative_step_anchors_at_max() {
        let limit = Limit::new(0.0, 1.0, -0.3);
        assert_abs_diff_eq!(limit.validate(0.5), 0.4, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_limit_returns_min() {
        assert_eq!(Limit::new(2.0, 1.0, 0.0).validate(1.5), 2.0);
    }

    #[test]
    fn defaults_survive_raw_round_trip() {
        let controls = Controls::default();
        assert_eq!(Controls::from_raw(&controls.to_raw()), Ok(controls));
    }

    #[test]
    fn out_of_range_raw_values_are_clamped() {
        let mut raw = Controls::default().to_raw();
        raw[OSC3_MODE] = 42.0;
        raw[OSC2_WAVEFORM] = -3.0;
        raw[TREMOLO] = 2.0;
        raw[MIDI_NOTE] = 200.0;

        let controls = Controls::from_raw(&raw).unwrap();
        assert_eq!(controls.osc3_mode, ModulationMode::Am2);
        assert_eq!(controls.osc2_waveform, Waveform::Sine);
        assert_eq!(controls.tremolo, 0.5);
        assert_eq!(controls.midi_note, NoteFilter::Any);
    }

    #[test]
    fn selectors_decode() {
        let mut raw = Controls::default().to_raw();
        raw[MIDI_NOTE] = 60.0;
        raw[DEPTH_CC] = 1.0;
        raw[OSC1_MODE] = 2.0;
        raw[OSC2_MODE] = 4.0;

        let controls = Controls::from_raw(&raw).unwrap();
        assert_eq!(controls.midi_note, NoteFilter::Key(60));
        assert_eq!(controls.depth_source, DepthSource::Cc(1));
        assert_eq!(controls.osc1_mode, SourceMode::User);
        assert_eq!(controls.osc2_mode, ModulationMode::Pm1);
    }

    #[test]
    fn unknown_selectors_are_errors() {
        assert_eq!(
            waveform(4.0),
            Err(Error::UnknownSelector {
                kind: "waveform",
                value: 4.0
            })
        );
        assert!(modulation_mode(0.0).is_err());
        assert!(source_mode(3.0).is_err());
    }

    #[test]
    fn depth_from_dial_and_cc() {
        let mut controls = Controls {
            depth_cents: 30.0,
            ..Controls::default()
        };
        assert_abs_diff_eq!(controls.depth(1.0), 0.3, epsilon = 1e-9);

        controls.depth_source = DepthSource::Cc(1);
        assert_abs_diff_eq!(controls.depth(1.0), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(controls.depth(0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn note_filter_matches() {
        assert!(NoteFilter::Any.matches(0));
        assert!(NoteFilter::Key(60).matches(60));
        assert!(!NoteFilter::Key(60).matches(61));
    }
}
