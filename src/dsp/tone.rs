//! Tone — one fully rendered note: oscillator × fade envelope × volume.

use std::time::Duration;

use crate::error::SynthError;

use super::envelope::FadeEnvelope;
use super::oscillator::Waveform;

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44100;
/// Output channel count; both channels carry the same signal.
pub const CHANNELS: u16 = 2;
/// Longest tone or pause accepted, in seconds.
pub const MAX_DURATION: f64 = 60.0;

/// Parameters for a single synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    /// Frequency in Hz, > 0.
    pub frequency: f64,
    /// Duration in seconds, in (0, [`MAX_DURATION`]].
    pub duration: f64,
    pub waveform: Waveform,
    /// Linear gain [0, 1].
    pub volume: f64,
}

impl ToneSpec {
    pub fn validate(&self) -> Result<(), SynthError> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(SynthError::InvalidFrequency(self.frequency));
        }
        if !(self.duration > 0.0 && self.duration <= MAX_DURATION) {
            return Err(SynthError::InvalidDuration(self.duration));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(SynthError::InvalidVolume(self.volume));
        }
        Ok(())
    }

    /// Number of stereo frames this tone renders to.
    pub fn frame_count(&self) -> usize {
        (SAMPLE_RATE as f64 * self.duration).round() as usize
    }
}

/// Interleaved 16-bit stereo PCM at [`SAMPLE_RATE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
}

impl PcmBuffer {
    /// A silent buffer of `frames` stereo frames.
    pub fn silence(frames: usize) -> Self {
        PcmBuffer {
            samples: vec![0; frames * CHANNELS as usize],
        }
    }

    /// Build a stereo buffer by duplicating each mono sample to both channels.
    pub fn from_mono<I>(mono: I) -> Self
    where
        I: IntoIterator<Item = i16>,
    {
        let samples = mono.into_iter().flat_map(|s| [s, s]).collect();
        PcmBuffer { samples }
    }

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples (L, R, L, R, ...).
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    /// Left/right pair at `frame`.
    pub fn frame(&self, frame: usize) -> Option<(i16, i16)> {
        let i = frame * CHANNELS as usize;
        Some((*self.samples.get(i)?, *self.samples.get(i + 1)?))
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / SAMPLE_RATE as f64)
    }

    /// Samples scaled to [-1, 1] for float audio APIs.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32 / i16::MAX as f32).collect()
    }
}

/// Render a tone into a stereo PCM buffer with the fade envelope applied.
///
/// Rejects non-positive frequency, duration outside (0, MAX_DURATION] and
/// volume outside [0, 1].
pub fn synthesize(spec: &ToneSpec) -> Result<PcmBuffer, SynthError> {
    spec.validate()?;
    let frames = spec.frame_count();
    let sr = SAMPLE_RATE as f64;
    let envelope = FadeEnvelope::new(frames, sr);

    let mono = envelope.gains().enumerate().map(|(i, gain)| {
        let t = i as f64 / sr;
        quantize(spec.waveform.value_at(spec.frequency, t) * gain * spec.volume)
    });
    Ok(PcmBuffer::from_mono(mono))
}

/// Clamp to [-1, 1], scale by 32767 and truncate toward zero.
pub fn quantize(x: f64) -> i16 {
    (x.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}
