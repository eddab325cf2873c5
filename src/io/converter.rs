use crate::io::{
    midi::{MidiEvent, CC_ALL_NOTES_OFF, CC_ALL_SOUNDS_OFF},
    params::{Controls, DepthSource},
};

/// What a filtered MIDI event asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteAction {
    /// Start envelope and oscillators for `key`.
    NoteOn { key: u8 },
    /// Release if `key` is the held note.
    NoteOff { key: u8 },
    /// Release the held note.
    AllNotesOff,
    /// Release the held note and stop the oscillators.
    AllSoundsOff,
    /// New depth CC position in `0.0..=1.0`.
    Depth(f64),
}

/// Filter `midi` through the channel mask, note selector and depth CC of
/// `controls`.
///
/// Notes need their channel bit set. Controller messages also pass when the
/// mask is empty, so a panic CC always gets through.
pub fn midi_to_action(midi: MidiEvent, controls: &Controls) -> Option<NoteAction> {
    let listening = |channel: u8| controls.midi_channels & (1 << (channel & 0x0F)) != 0;

    match midi {
        MidiEvent::NoteOn { channel, key, .. }
            if listening(channel) && controls.midi_note.matches(key) =>
        {
            Some(NoteAction::NoteOn { key })
        }
        MidiEvent::NoteOff { channel, key, .. } if listening(channel) => {
            Some(NoteAction::NoteOff { key })
        }
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        } if listening(channel) || controls.midi_channels == 0 => match controller {
            CC_ALL_NOTES_OFF => Some(NoteAction::AllNotesOff),
            CC_ALL_SOUNDS_OFF => Some(NoteAction::AllSoundsOff),
            cc if controls.depth_source == DepthSource::Cc(cc) => {
                Some(NoteAction::Depth(value as f64 / 127.0))
            }
            _ => None,
        },
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::params::NoteFilter;

    fn note_on(channel: u8, key: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 100,
        }
    }

    fn cc(channel: u8, controller: u8, value: u8) -> MidiEvent {
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        }
    }

    #[test]
    fn channel_mask_filters_notes() {
        let controls = Controls {
            midi_channels: 0b0000_0000_0000_0100,
            ..Controls::default()
        };

        assert_eq!(
            midi_to_action(note_on(2, 60), &controls),
            Some(NoteAction::NoteOn { key: 60 })
        );
        assert_eq!(midi_to_action(note_on(3, 60), &controls), None);
    }

    #[test]
    fn note_selector_filters_note_on_only() {
        let controls = Controls {
            midi_note: NoteFilter::Key(64),
            ..Controls::default()
        };

        assert_eq!(midi_to_action(note_on(0, 60), &controls), None);
        assert_eq!(
            midi_to_action(note_on(0, 64), &controls),
            Some(NoteAction::NoteOn { key: 64 })
        );

        let off = MidiEvent::NoteOff {
            channel: 0,
            key: 60,
            velocity: 0,
        };
        assert_eq!(
            midi_to_action(off, &controls),
            Some(NoteAction::NoteOff { key: 60 })
        );
    }

    #[test]
    fn panic_ccs_pass_an_empty_mask() {
        let controls = Controls {
            midi_channels: 0,
            ..Controls::default()
        };

        assert_eq!(midi_to_action(note_on(0, 60), &controls), None);
        assert_eq!(
            midi_to_action(cc(5, CC_ALL_NOTES_OFF, 0), &controls),
            Some(NoteAction::AllNotesOff)
        );
        assert_eq!(
            midi_to_action(cc(5, CC_ALL_SOUNDS_OFF, 0), &controls),
            Some(NoteAction::AllSoundsOff)
        );
    }

    #[test]
    fn depth_cc_only_when_configured() {
        let mut controls = Controls::default();
        assert_eq!(midi_to_action(cc(0, 1, 127), &controls), None);

        controls.depth_source = DepthSource::Cc(1);
        assert_eq!(
            midi_to_action(cc(0, 1, 127), &controls),
            Some(NoteAction::Depth(1.0))
        );
        assert_eq!(midi_to_action(cc(0, 2, 127), &controls), None);
    }

    #[test]
    fn other_messages_are_ignored() {
        let controls = Controls::default();
        let bend = MidiEvent::PitchBend {
            channel: 0,
            value: 100,
        };
        assert_eq!(midi_to_action(bend, &controls), None);
    }

    #[test]
    fn note_frequencies() {
        assert_eq!(midi_note_to_freq(69), 440.0);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
    }
}
