//! WAV renderer — flattens a PlaybackPlan into one buffer and encodes it.

use std::fs;
use std::path::Path;

use crate::error::{PlaybackError, TrainerError};
use crate::playback::{Cue, PlaybackPlan};

use super::mixer::Mixer;
use super::oscillator::Waveform;
use super::tone::{CHANNELS, PcmBuffer, SAMPLE_RATE};

/// Render a plan onto one timeline exactly as the worker would sound it.
///
/// Sounds start at the current cursor and do not advance it; only waits
/// do, so tones that outlast the following wait overlap.
pub fn render_plan(plan: &PlaybackPlan, waveform: Waveform) -> Result<PcmBuffer, TrainerError> {
    let cues = plan.synthesize(waveform)?;
    let mut mixer = Mixer::new();
    let mut cursor = 0usize;
    for cue in &cues {
        match cue {
            Cue::Sound(buffer) => mixer.add(cursor, buffer),
            Cue::Wait(d) => cursor += (d.as_secs_f64() * SAMPLE_RATE as f64).round() as usize,
        }
    }
    mixer.extend_to(cursor);
    Ok(mixer.output())
}

/// Render a plan to WAV bytes (16-bit stereo PCM).
pub fn render_wav(plan: &PlaybackPlan, waveform: Waveform) -> Result<Vec<u8>, TrainerError> {
    let pcm = render_plan(plan, waveform)?;
    Ok(encode_wav(pcm.samples(), SAMPLE_RATE, CHANNELS))
}

/// Write a PCM buffer to a WAV file.
pub fn write_wav(path: &Path, pcm: &PcmBuffer) -> Result<(), PlaybackError> {
    fs::write(path, encode_wav(pcm.samples(), SAMPLE_RATE, CHANNELS))?;
    Ok(())
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
