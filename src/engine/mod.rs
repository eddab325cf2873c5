//! The per-sample vibrato/tremolo engine.

pub mod message;
pub mod router;
pub mod scheduler;

#[cfg(feature = "rtrb")]
use self::message::{message_queue, EngineHandle};
use self::{
    message::{EngineMessage, MessageReceiver},
    router::{Modulation, ModulationRouter},
    scheduler::Scheduler,
};
use crate::{
    dsp::{
        delay::HistoryBuffer, envelope::Envelope, envelope::FaderShape, fader::DeclickFader,
        mix::blend_dry_wet,
    },
    error::{Error, Result},
    io::{
        converter::{midi_to_action, NoteAction},
        midi::{MidiEvent, TimedEvent},
        params::Controls,
    },
    HISTORY_CAPACITY, SEMITONE_RATIO,
};

/*
Signal Path
===========

Every sample:

    router ──(signal, integral)──→ × envelope ──┬── integral × depth ──→ shift fader
                                                └── signal × tremolo ──→ amp fader

    input ──→ history ──┬── [offset]          ──────────────→ dry ─┐
                        └── [offset + shift] ──→ × amp ───→ wet ─┴─ mix fader ─→ output

Vibrato reads the history at a moving distance behind the write head. The
base distance `offset` is (2^(1/12) - 1) · rate samples, enough room for one
second of shift up to a semitone in either direction. The dry path reads at
the same base distance so dry and wet stay aligned; that distance is the
reported latency.

The shift fader moves by at most 2^(1/12) - 1 samples per sample, which caps
the instantaneous pitch deviation at one semitone. The read index is truncated
to a whole sample. A negative or non-finite index saturates to 0; anything
past the buffer reads the oldest sample.

Notes
-----

Note-on (after the MIDI filter) loads the current ADSR and restarts envelope
and all three oscillators. Note-off for the held note moves the envelope to
release; it never cuts the oscillators. All Sounds Off does.
*/

const SHIFT_STEP: f64 = SEMITONE_RATIO - 1.0;
const AMP_STEP: f64 = 0.001;
const MIX_STEP: f64 = 0.001;

pub struct VibratoEngine {
    rate: f64,
    controls: Controls,

    router: ModulationRouter,
    envelope: Envelope,

    shift: DeclickFader,
    amp: DeclickFader,
    mix: DeclickFader,

    history: [HistoryBuffer; 2],
    offset: usize,

    depth: f64,
    depth_cc: f64,
    held_note: Option<u8>,

    rx: Option<Box<dyn MessageReceiver + Send>>,
}

impl VibratoEngine {
    pub fn new(sample_rate: f64) -> Result<Self> {
        Self::with_capacity(sample_rate, HISTORY_CAPACITY)
    }

    /// Like [`VibratoEngine::new`] with a custom history length per channel.
    pub fn with_capacity(sample_rate: f64, capacity: usize) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let offset = (SHIFT_STEP * sample_rate) as usize;
        if offset >= capacity {
            return Err(Error::HistoryTooSmall {
                required: offset + 1,
                capacity,
            });
        }

        tracing::debug!(sample_rate, offset, capacity, "vibrato engine created");

        let mut engine = Self {
            rate: sample_rate,
            controls: Controls::default(),
            router: ModulationRouter::new(),
            envelope: Envelope::new().with_shape(FaderShape::InvSquare),
            shift: DeclickFader::new(0.0, SHIFT_STEP),
            amp: DeclickFader::new(1.0, AMP_STEP),
            mix: DeclickFader::new(0.0, MIX_STEP),
            history: [
                HistoryBuffer::with_capacity(capacity),
                HistoryBuffer::with_capacity(capacity),
            ],
            offset,
            depth: 0.0,
            depth_cc: 1.0,
            held_note: None,
            rx: None,
        };
        engine.apply_controls(Controls::default());
        Ok(engine)
    }

    /// An engine plus the handle a control thread uses to drive it.
    #[cfg(feature = "rtrb")]
    pub fn with_handle(sample_rate: f64, queue_size: usize) -> Result<(Self, EngineHandle)> {
        let mut engine = Self::new(sample_rate)?;
        let (handle, rx) = message_queue(queue_size);
        engine.set_receiver(rx);
        Ok((engine, handle))
    }

    /// Drain `rx` at the start of every block.
    pub fn set_receiver<R: MessageReceiver + Send + 'static>(&mut self, rx: R) {
        self.rx = Some(Box::new(rx));
    }

    /// Replace the controller set. Envelope times take effect on the next
    /// note-on; oscillator settings on the next sample; the mix target on the
    /// next block.
    pub fn set_controls(&mut self, controls: Controls) {
        self.apply_controls(controls);
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Processing delay of the dry and wet paths, in samples.
    pub fn latency(&self) -> usize {
        self.offset
    }

    pub fn sample_rate(&self) -> f64 {
        self.rate
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    /// Current vibrato depth multiplier.
    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn held_note(&self) -> Option<u8> {
        self.held_note
    }

    /// Render one block. `events` must be sorted by frame; each is applied
    /// after the frames before it and before the frames after it.
    pub fn process_block(
        &mut self,
        inputs: [&[f32]; 2],
        mut outputs: [&mut [f32]; 2],
        events: &[TimedEvent],
    ) {
        debug_assert_eq!(inputs[0].len(), inputs[1].len());
        debug_assert_eq!(inputs[0].len(), outputs[0].len());
        debug_assert_eq!(outputs[0].len(), outputs[1].len());

        self.drain_messages();
        self.mix.set(self.mix_target());

        let len = inputs
            .iter()
            .map(|b| b.len())
            .chain(outputs.iter().map(|b| b.len()))
            .min()
            .unwrap_or(0);

        for segment in Scheduler::new(len, events) {
            self.render(&inputs, &mut outputs, segment.frames);
            if let Some(event) = segment.event {
                self.handle_event(event);
            }
        }
    }

    /// Apply a MIDI event through the channel/note/CC filter.
    pub fn handle_event(&mut self, event: MidiEvent) {
        if let Some(action) = midi_to_action(event, &self.controls) {
            self.apply(action);
        }
    }

    /// Start a note regardless of the MIDI filter.
    pub fn note_on(&mut self, key: u8) {
        let c = &self.controls;
        self.envelope
            .set_parameters(c.attack, c.decay, c.sustain, c.release);

        self.router.start();
        self.envelope.start();
        self.held_note = Some(key);
    }

    /// Release if `key` is the held note.
    pub fn note_off(&mut self, key: u8) {
        if self.held_note == Some(key) {
            self.release_held();
        }
    }

    /// One sample of envelope-weighted modulation, advancing the router and
    /// the envelope. Used by [`VibratoEngine::process_block`].
    #[inline]
    fn next_modulation(&mut self, sample_time: f64) -> Modulation {
        let mut modulation = self.router.next(sample_time, self.rate);
        self.envelope.run(sample_time);
        modulation *= self.envelope.value();
        modulation
    }

    fn render(
        &mut self,
        inputs: &[&[f32]; 2],
        outputs: &mut [&mut [f32]; 2],
        frames: std::ops::Range<usize>,
    ) {
        let sample_time = 1.0 / self.rate;
        let tremolo = self.controls.tremolo as f64;

        for i in frames {
            let modulation = self.next_modulation(sample_time);

            self.shift.set(SHIFT_STEP * modulation.integral * self.depth);
            self.amp.set(1.0 - tremolo * modulation.signal);
            self.mix.proceed();

            let mix = self.mix.get() as f32;
            let amp = self.amp.get() as f32;
            // `as` saturates: negative and NaN land on 0
            let wet_index = (self.offset as f64 + self.shift.get()) as usize;

            for (channel, history) in self.history.iter_mut().enumerate() {
                history.push(inputs[channel][i]);
                let dry = history.get(self.offset);
                let wet = amp * history.get(wet_index);
                outputs[channel][i] = blend_dry_wet(dry, wet, mix);
            }
        }
    }

    fn drain_messages(&mut self) {
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        while let Some(message) = rx.pop() {
            match message {
                EngineMessage::Controls(controls) => self.apply_controls(controls),
                EngineMessage::NoteOn { key } => self.note_on(key),
                EngineMessage::NoteOff { key } => self.note_off(key),
                EngineMessage::Midi(event) => self.handle_event(event),
            }
        }
        self.rx = Some(rx);
    }

    fn apply(&mut self, action: NoteAction) {
        match action {
            NoteAction::NoteOn { key } => self.note_on(key),
            NoteAction::NoteOff { key } => self.note_off(key),
            NoteAction::AllNotesOff => self.release_held(),
            NoteAction::AllSoundsOff => {
                self.release_held();
                self.router.stop();
            }
            NoteAction::Depth(position) => {
                self.depth_cc = position;
                self.depth = self.controls.depth(position);
            }
        }
    }

    fn release_held(&mut self) {
        if self.held_note.take().is_some() {
            self.envelope.release();
        }
    }

    fn apply_controls(&mut self, controls: Controls) {
        self.controls = controls;
        self.depth = controls.depth(self.depth_cc);

        self.router.set_osc1(controls.osc1_mode, controls.osc1_freq);
        self.router
            .set_osc2(controls.osc2_mode, controls.osc2_amp, controls.osc2_freq);
        self.router
            .set_osc3(controls.osc3_mode, controls.osc3_amp, controls.osc3_freq);

        let waveforms = [
            controls.osc1_waveform,
            controls.osc2_waveform,
            controls.osc3_waveform,
        ];
        for (osc, waveform) in self.router.oscillators_mut().into_iter().zip(waveforms) {
            osc.set_waveform(waveform);
        }
    }

    fn mix_target(&self) -> f64 {
        let bypass = if self.controls.bypass { 1.0 } else { 0.0 };
        (1.0 - bypass) * self.controls.dry_wet as f64
    }
}
