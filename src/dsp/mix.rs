//! Dry/wet crossfading.

/*
Dry/Wet
=======

  dry   the untouched input (here: delayed by the base offset so it lines up
        with the vibrato path)
  wet   the effect signal (vibrato read, tremolo gain)

A linear crossfade with complementary weights:

    output = dry × (1 - mix) + wet × mix

      mix = 0.0  →  dry only
      mix = 1.0  →  wet only

The weights always sum to 1.0, so a full-scale dry and wet never add up past
full scale. Linear crossfades dip slightly in perceived loudness around
mix = 0.5 for uncorrelated signals; for a vibrato the dry and wet copies are
nearly the same signal, so the dip is negligible.
*/

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
///
/// # Example
/// ```
/// use vibrato_dsp::dsp::mix::blend_dry_wet;
/// assert_eq!(blend_dry_wet(1.0, 0.0, 0.25), 0.75);
/// ```
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}
