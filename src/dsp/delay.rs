//! Fixed-capacity history of recent input samples.

/// Ring buffer addressed backwards from the newest sample: `get(0)` is the
/// sample pushed last, `get(1)` the one before it, and so on.
///
/// Storage is allocated once in [`HistoryBuffer::with_capacity`]; `push` and
/// `get` never allocate.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(crate::HISTORY_CAPACITY)
    }

    /// A zero capacity is bumped to one sample.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.buffer[self.write_pos] = sample;
    }

    /// Sample pushed `samples_back` pushes ago. Reads past the capacity
    /// return the oldest sample still held.
    #[inline]
    pub fn get(&self, samples_back: usize) -> f32 {
        let len = self.buffer.len();
        let samples_back = samples_back.min(len - 1);
        let read_pos = (self.write_pos + len - samples_back) % len;
        self.buffer[read_pos]
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
