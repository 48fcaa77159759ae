//! Mixer — sums PCM buffers sample by sample.

use super::tone::{CHANNELS, PcmBuffer};

/// Accumulates PCM buffers placed at frame offsets into one buffer.
///
/// The output grows to fit whatever is added. Sums saturate at the i16
/// limits instead of wrapping.
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    buffer: PcmBuffer,
}

impl Mixer {
    pub fn new() -> Self {
        Mixer::default()
    }

    /// Add `source` starting at frame `offset`.
    pub fn add(&mut self, offset: usize, source: &PcmBuffer) {
        let end = offset + source.frames();
        if end > self.buffer.frames() {
            self.extend_to(end);
        }
        let start = offset * CHANNELS as usize;
        let dest = &mut self.buffer.samples_mut()[start..start + source.samples().len()];
        for (d, &s) in dest.iter_mut().zip(source.samples()) {
            *d = d.saturating_add(s);
        }
    }

    /// Pad with silence so the output spans at least `frames`.
    pub fn extend_to(&mut self, frames: usize) {
        if frames <= self.buffer.frames() {
            return;
        }
        let mut grown = PcmBuffer::silence(frames);
        let len = self.buffer.samples().len();
        grown.samples_mut()[..len].copy_from_slice(self.buffer.samples());
        self.buffer = grown;
    }

    /// Output length in frames.
    pub fn frames(&self) -> usize {
        self.buffer.frames()
    }

    pub fn output(self) -> PcmBuffer {
        self.buffer
    }
}

/// Play several buffers at once: one buffer as long as the longest input.
pub fn mix(sources: &[PcmBuffer]) -> PcmBuffer {
    let mut mixer = Mixer::new();
    for source in sources {
        mixer.add(0, source);
    }
    mixer.output()
}
