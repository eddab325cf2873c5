// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;
pub mod params;

pub use converter::{midi_to_action, NoteAction};
pub use midi::{MidiEvent, TimedEvent};
pub use params::{Controls, DepthSource, Limit, NoteFilter, CONTROLLER_COUNT, LIMITS};
