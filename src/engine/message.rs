#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::io::{midi::MidiEvent, params::Controls};

/// Control-thread requests, applied at the start of the next block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    Controls(Controls),
    /// Bypasses the MIDI filter.
    NoteOn { key: u8 },
    NoteOff { key: u8 },
    /// Goes through the MIDI filter like a host event at frame 0.
    Midi(MidiEvent),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

/// Default queue depth for [`message_queue`].
pub const MESSAGE_QUEUE_SIZE: usize = 64;

/// Non-real-time side of the engine's message queue.
///
/// Every `send` returns `false` when the queue is full; the message is
/// dropped, never blocked on.
#[cfg(feature = "rtrb")]
pub struct EngineHandle {
    tx: Producer<EngineMessage>,
}

#[cfg(feature = "rtrb")]
impl EngineHandle {
    pub fn send_controls(&mut self, controls: Controls) -> bool {
        self.send(EngineMessage::Controls(controls))
    }

    pub fn note_on(&mut self, key: u8) -> bool {
        self.send(EngineMessage::NoteOn { key })
    }

    pub fn note_off(&mut self, key: u8) -> bool {
        self.send(EngineMessage::NoteOff { key })
    }

    pub fn send_midi(&mut self, event: MidiEvent) -> bool {
        self.send(EngineMessage::Midi(event))
    }

    fn send(&mut self, message: EngineMessage) -> bool {
        match self.tx.push(message) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(?message, "engine queue full, message dropped");
                false
            }
        }
    }
}

/// A handle/consumer pair with room for `capacity` messages.
#[cfg(feature = "rtrb")]
pub fn message_queue(capacity: usize) -> (EngineHandle, Consumer<EngineMessage>) {
    let (tx, rx) = RingBuffer::<EngineMessage>::new(capacity);
    (EngineHandle { tx }, rx)
}
