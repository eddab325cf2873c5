use std::{ops::Range, slice};

use crate::io::midi::{MidiEvent, TimedEvent};

/// A run of frames to render, followed by the event that ends it.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub frames: Range<usize>,
    /// `None` for the tail of the block.
    pub event: Option<MidiEvent>,
}

/// Splits one block at the frame offsets of its events.
///
/// Yields `[last, frame)` + event for every event, then the final
/// `[last, len)`. Frames past the block end clamp to the end; a frame earlier
/// than its predecessor clamps to the predecessor, so segments never overlap
/// or run backwards.
pub struct Scheduler<'a> {
    events: slice::Iter<'a, TimedEvent>,
    len: usize,
    last: usize,
    done: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(len: usize, events: &'a [TimedEvent]) -> Self {
        Self {
            events: events.iter(),
            len,
            last: 0,
            done: false,
        }
    }
}

impl Iterator for Scheduler<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if let Some(timed) = self.events.next() {
            let frame = timed.frame.min(self.len).max(self.last);
            let frames = self.last..frame;
            self.last = frame;
            return Some(Segment {
                frames,
                event: Some(timed.event),
            });
        }

        if self.done {
            return None;
        }
        self.done = true;
        Some(Segment {
            frames: self.last..self.len,
            event: None,
        })
    }
}
