//! vibrato - play a test tone through the vibrato engine
//!
//! Run with: cargo run --bin vibrato
//!
//! A note is held for two seconds, released for one, and so on, so the depth
//! envelope can be heard rising and falling. Set `RUST_LOG=debug` for more.

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing_subscriber::EnvFilter;

use vibrato_dsp::{
    dsp::lfo::Waveform,
    engine::{message::MESSAGE_QUEUE_SIZE, router::ModulationMode},
    io::{converter::midi_note_to_freq, Controls},
    VibratoEngine, MAX_BLOCK_SIZE,
};

const TONE_NOTE: u8 = 57; // A3
const TRIGGER_NOTE: u8 = 60;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;

    let (mut engine, mut handle) = VibratoEngine::with_handle(sample_rate, MESSAGE_QUEUE_SIZE)
        .wrap_err("failed to create engine")?;
    engine.set_controls(Controls {
        depth_cents: 50.0,
        tremolo: 0.2,
        attack: 0.5,
        release: 0.75,
        osc1_waveform: Waveform::Triangle,
        osc3_mode: ModulationMode::Fm1,
        osc3_amp: 0.3,
        osc3_freq: 0.25,
        ..Controls::default()
    });

    tracing::info!(
        sample_rate,
        channels,
        latency = engine.latency(),
        "starting output stream"
    );

    let tone_step = midi_note_to_freq(TONE_NOTE) as f64 / sample_rate;
    let mut tone_phase = 0.0f64;
    let mut input = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                // naive sawtooth, bright enough to hear the pitch wobble
                for sample in &mut input[..frames] {
                    *sample = (0.4 * (2.0 * tone_phase - 1.0)) as f32;
                    tone_phase = (tone_phase + tone_step).fract();
                }

                engine.process_block(
                    [&input[..frames], &input[..frames]],
                    [&mut left[..frames], &mut right[..frames]],
                    &[],
                );

                let out_off = frames_written * channels;
                for i in 0..frames {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = if ch % 2 == 0 { left[i] } else { right[i] };
                    }
                }

                frames_written += frames;
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;
    tracing::info!("playing... press Ctrl+C to stop");

    loop {
        if !handle.note_on(TRIGGER_NOTE) {
            tracing::warn!("note on dropped");
        }
        thread::sleep(Duration::from_secs(2));
        if !handle.note_off(TRIGGER_NOTE) {
            tracing::warn!("note off dropped");
        }
        thread::sleep(Duration::from_secs(1));
    }
}
