//! Typed MIDI channel messages.

/// MIDI status nibbles this crate understands.
const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const PITCH_BEND: u8 = 0xE0;

/// CC 120: silence immediately.
pub const CC_ALL_SOUNDS_OFF: u8 = 120;
/// CC 123: release every held note.
pub const CC_ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Parse a short channel message. Returns `None` for system messages,
    /// truncated input and status types not listed above.
    ///
    /// Data bytes are masked to 7 bits. A note-on with velocity 0 stays a
    /// note-on.
    ///
    /// ```
    /// use vibrato_dsp::io::midi::MidiEvent;
    /// assert_eq!(
    ///     MidiEvent::from_bytes(&[0x91, 60, 100]),
    ///     Some(MidiEvent::NoteOn { channel: 1, key: 60, velocity: 100 })
    /// );
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            NOTE_OFF => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            NOTE_ON => MidiEvent::NoteOn {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            CONTROL_CHANGE => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            PROGRAM_CHANGE => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            PITCH_BEND => {
                let lsb = byte(0)? as i16;
                let msb = byte(1)? as i16;
                MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// A MIDI event placed at a frame offset inside the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub frame: usize,
    pub event: MidiEvent,
}

impl TimedEvent {
    pub fn new(frame: usize, event: MidiEvent) -> Self {
        Self { frame, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_messages() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x80, 64, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 64,
                velocity: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xBF, CC_ALL_NOTES_OFF, 0]),
            Some(MidiEvent::ControlChange {
                channel: 15,
                controller: 123,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xC2, 5]),
            Some(MidiEvent::ProgramChange {
                channel: 2,
                program: 5
            })
        );
    }

    #[test]
    fn pitch_bend_is_centered() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x00]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: -8192
            })
        );
    }

    #[test]
    fn rejects_short_and_system_messages() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xA0, 60, 10]), None);
    }

    #[test]
    fn channel_accessor() {
        let event = MidiEvent::NoteOn {
            channel: 9,
            key: 36,
            velocity: 1,
        };
        assert_eq!(event.channel(), 9);
    }
}
