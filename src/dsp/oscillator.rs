//! Naive (non band-limited) oscillators evaluated at absolute time.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Value of the waveform at `t` seconds for frequency `freq`.
    pub fn value_at(self, freq: f64, t: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * freq * t).sin(),
            Waveform::Square => square(freq, t),
            Waveform::Sawtooth => sawtooth(freq, t),
            Waveform::Triangle => sawtooth(freq, t).abs() * 2.0 - 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }
}

/// Sign of the sine; exactly zero maps to a silent sample.
fn square(freq: f64, t: f64) -> f64 {
    let s = (2.0 * PI * freq * t).sin();
    if s > 0.0 {
        1.0
    } else if s < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Rises from -1 towards +1 once per period, in [-1, 1).
fn sawtooth(freq: f64, t: f64) -> f64 {
    let x = freq * t;
    2.0 * (x - (x + 0.5).floor())
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "triangle" => Ok(Waveform::Triangle),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "square" => Ok(Waveform::Square),
            _ => Err(ParseError::Waveform(s.to_string())),
        }
    }
}
