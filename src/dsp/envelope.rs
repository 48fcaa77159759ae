//! Fade envelope: linear fade-in, flat sustain, linear fade-out.

/// Fade-in time in seconds.
pub const FADE_IN: f64 = 0.05;
/// Fade-out time in seconds.
pub const FADE_OUT: f64 = 0.1;

/// Gain envelope for a tone of a fixed number of samples.
///
/// The fade-in ramps from exactly 0.0 on the first sample to exactly 1.0
/// on the last sample of the window; the fade-out mirrors it, ending on
/// 0.0. When the tone is too short for both windows, each window is
/// clamped to half the tone length so the two never overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    len: usize,
    attack: usize,
    release: usize,
}

impl FadeEnvelope {
    /// Envelope with the default 50 ms / 100 ms windows.
    pub fn new(len: usize, sample_rate: f64) -> Self {
        Self::with_times(len, sample_rate, FADE_IN, FADE_OUT)
    }

    pub fn with_times(len: usize, sample_rate: f64, fade_in: f64, fade_out: f64) -> Self {
        let half = len / 2;
        let attack = ((sample_rate * fade_in) as usize).min(half);
        let release = ((sample_rate * fade_out) as usize).min(half);
        FadeEnvelope {
            len,
            attack,
            release,
        }
    }

    /// Fade-in window length in samples.
    pub fn attack_samples(&self) -> usize {
        self.attack
    }

    /// Fade-out window length in samples.
    pub fn release_samples(&self) -> usize {
        self.release
    }

    /// Gain [0, 1] at sample `index`. Out-of-range indices are silent.
    pub fn gain(&self, index: usize) -> f64 {
        if index >= self.len {
            return 0.0;
        }
        let release_start = self.len - self.release;
        if index >= release_start {
            1.0 - ramp(index - release_start, self.release)
        } else if index < self.attack {
            ramp(index, self.attack)
        } else {
            1.0
        }
    }

    /// Iterate over the gain of every sample.
    pub fn gains(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(|i| self.gain(i))
    }
}

/// Position `i` of an inclusive 0→1 ramp over `n` points.
fn ramp(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}
