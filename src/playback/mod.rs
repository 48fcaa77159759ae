//! Playback sequencing — turns a pair of pitches into timed play/wait steps.
//!
//! A [`PlaybackPlan`] is pure data: the [`worker`] performs it on a
//! background thread against an [`AudioSink`], and the
//! [`renderer`](crate::dsp::renderer) flattens it into a single buffer.

pub mod worker;

#[cfg(feature = "playback")]
pub mod output;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dsp::mixer::mix;
use crate::dsp::oscillator::Waveform;
use crate::dsp::tone::{MAX_DURATION, PcmBuffer, ToneSpec, synthesize};
use crate::error::{ParseError, PlaybackError, SynthError};

pub use worker::PlaybackWorker;

#[cfg(feature = "playback")]
pub use output::RodioOutput;

/// Platform audio output. `play` starts a buffer and returns immediately.
pub trait AudioSink {
    fn play(&mut self, buffer: &PcmBuffer) -> Result<(), PlaybackError>;
}

// ── Mode & Timing ───────────────────────────────────────────

/// How the two tones of a trial are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Root first, then target.
    #[default]
    Ascending,
    /// Target first, then root.
    Descending,
    /// Both tones at once.
    Harmonic,
}

impl PlaybackMode {
    pub const ALL: [PlaybackMode; 3] = [
        PlaybackMode::Ascending,
        PlaybackMode::Descending,
        PlaybackMode::Harmonic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlaybackMode::Ascending => "ascending",
            PlaybackMode::Descending => "descending",
            PlaybackMode::Harmonic => "harmonic",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaybackMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" | "up" => Ok(PlaybackMode::Ascending),
            "descending" | "desc" | "down" => Ok(PlaybackMode::Descending),
            "harmonic" | "chord" => Ok(PlaybackMode::Harmonic),
            _ => Err(ParseError::Mode(s.to_string())),
        }
    }
}

/// Durations (seconds) and per-tone volume used when building plans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackTiming {
    /// Length of each tone in melodic (ascending/descending) mode.
    pub tone: f64,
    /// Onset-to-onset delay between the two melodic tones.
    pub gap: f64,
    /// Length of the chord in harmonic mode.
    pub harmonic: f64,
    /// Volume of each individual tone [0, 1].
    pub volume: f64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            tone: 0.8,
            gap: 0.6,
            harmonic: 1.0,
            volume: 0.5,
        }
    }
}

// ── Plan ────────────────────────────────────────────────────

/// One pitch to sound for a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f64,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStep {
    /// Start these notes together, mixed into one buffer. Does not wait
    /// for them to finish.
    Play(Vec<Note>),
    /// Pause before the next step, in seconds.
    Wait(f64),
}

/// An ordered list of play/wait steps for the audio collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPlan {
    pub steps: Vec<PlaybackStep>,
    /// Volume applied to each note.
    pub volume: f64,
}

/// A plan step with its audio already synthesized.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Sound(PcmBuffer),
    Wait(Duration),
}

impl PlaybackPlan {
    /// Sequence a root/target pair for the given mode.
    pub fn for_pair(root: f64, target: f64, mode: PlaybackMode, timing: &PlaybackTiming) -> Self {
        let note = |frequency, duration| Note {
            frequency,
            duration,
        };
        let steps = match mode {
            PlaybackMode::Ascending => vec![
                PlaybackStep::Play(vec![note(root, timing.tone)]),
                PlaybackStep::Wait(timing.gap),
                PlaybackStep::Play(vec![note(target, timing.tone)]),
            ],
            PlaybackMode::Descending => vec![
                PlaybackStep::Play(vec![note(target, timing.tone)]),
                PlaybackStep::Wait(timing.gap),
                PlaybackStep::Play(vec![note(root, timing.tone)]),
            ],
            PlaybackMode::Harmonic => vec![PlaybackStep::Play(vec![
                note(root, timing.harmonic),
                note(target, timing.harmonic),
            ])],
        };
        PlaybackPlan {
            steps,
            volume: timing.volume,
        }
    }

    /// Every note in the plan, in step order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PlaybackStep::Play(notes) => Some(notes),
                PlaybackStep::Wait(_) => None,
            })
            .flatten()
    }

    fn tone_spec(&self, note: &Note, waveform: Waveform) -> ToneSpec {
        ToneSpec {
            frequency: note.frequency,
            duration: note.duration,
            waveform,
            volume: self.volume,
        }
    }

    /// Check every note against the synthesizer contract without rendering.
    pub fn validate(&self, waveform: Waveform) -> Result<(), SynthError> {
        for note in self.notes() {
            self.tone_spec(note, waveform).validate()?;
        }
        for step in &self.steps {
            if let PlaybackStep::Wait(secs) = step {
                if Duration::try_from_secs_f64(*secs).is_err() || *secs > MAX_DURATION {
                    return Err(SynthError::InvalidDuration(*secs));
                }
            }
        }
        Ok(())
    }

    /// Synthesize every `Play` step. Simultaneous notes are mixed.
    pub fn synthesize(&self, waveform: Waveform) -> Result<Vec<Cue>, SynthError> {
        self.validate(waveform)?;
        self.steps
            .iter()
            .map(|step| match step {
                PlaybackStep::Play(notes) => {
                    let buffers = notes
                        .iter()
                        .map(|n| synthesize(&self.tone_spec(n, waveform)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Cue::Sound(mix(&buffers)))
                }
                PlaybackStep::Wait(secs) => Duration::try_from_secs_f64(*secs)
                    .map(Cue::Wait)
                    .map_err(|_| SynthError::InvalidDuration(*secs)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::theory::midi_to_frequency;

    #[test]
    fn ascending_plays_root_then_target() {
        let root = midi_to_frequency(60);
        let target = midi_to_frequency(67);
        let plan = PlaybackPlan::for_pair(root, target, PlaybackMode::Ascending, &PlaybackTiming::default());
        assert_eq!(
            plan.steps,
            vec![
                PlaybackStep::Play(vec![Note { frequency: root, duration: 0.8 }]),
                PlaybackStep::Wait(0.6),
                PlaybackStep::Play(vec![Note { frequency: target, duration: 0.8 }]),
            ]
        );
        assert!((root - 261.63).abs() < 0.01);
        assert!((target - 392.00).abs() < 0.1);
        assert_eq!(plan.volume, 0.5);
    }

    #[test]
    fn descending_reverses_order() {
        let plan = PlaybackPlan::for_pair(200.0, 300.0, PlaybackMode::Descending, &PlaybackTiming::default());
        let freqs: Vec<f64> = plan.notes().map(|n| n.frequency).collect();
        assert_eq!(freqs, vec![300.0, 200.0]);
        assert_eq!(plan.steps[1], PlaybackStep::Wait(0.6));
    }

    #[test]
    fn harmonic_is_one_simultaneous_step() {
        let plan = PlaybackPlan::for_pair(261.63, 392.0, PlaybackMode::Harmonic, &PlaybackTiming::default());
        assert_eq!(plan.steps.len(), 1);
        match &plan.steps[0] {
            PlaybackStep::Play(notes) => {
                assert_eq!(notes.len(), 2);
                assert!(notes.iter().all(|n| n.duration == 1.0));
                assert_eq!(notes[0].frequency, 261.63);
                assert_eq!(notes[1].frequency, 392.0);
            }
            other => panic!("Expected a play step, got {other:?}"),
        }
    }

    #[test]
    fn harmonic_synthesizes_one_mixed_buffer() {
        let plan = PlaybackPlan::for_pair(261.63, 392.0, PlaybackMode::Harmonic, &PlaybackTiming::default());
        let cues = plan.synthesize(Waveform::Sine).unwrap();
        assert_eq!(cues.len(), 1);
        let Cue::Sound(buf) = &cues[0] else {
            panic!("Expected sound");
        };
        assert_eq!(buf.frames(), 44100);
        // Two half-volume tones never exceed full scale.
        assert!(buf.samples().iter().all(|&s| s > i16::MIN && s < i16::MAX));
    }

    #[test]
    fn melodic_cues_alternate() {
        let plan = PlaybackPlan::for_pair(440.0, 880.0, PlaybackMode::Ascending, &PlaybackTiming::default());
        let cues = plan.synthesize(Waveform::Square).unwrap();
        assert_eq!(cues.len(), 3);
        assert!(matches!(&cues[0], Cue::Sound(b) if b.frames() == 35280));
        assert_eq!(cues[1], Cue::Wait(Duration::from_secs_f64(0.6)));
        assert!(matches!(&cues[2], Cue::Sound(b) if b.frames() == 35280));
    }

    #[test]
    fn invalid_timing_is_rejected() {
        let timing = PlaybackTiming {
            volume: 2.0,
            ..PlaybackTiming::default()
        };
        let plan = PlaybackPlan::for_pair(440.0, 880.0, PlaybackMode::Ascending, &timing);
        assert_eq!(plan.validate(Waveform::Sine), Err(SynthError::InvalidVolume(2.0)));

        let timing = PlaybackTiming {
            gap: -0.1,
            ..PlaybackTiming::default()
        };
        let plan = PlaybackPlan::for_pair(440.0, 880.0, PlaybackMode::Ascending, &timing);
        assert!(plan.synthesize(Waveform::Sine).is_err());
    }

    #[test]
    fn oversized_timing_from_settings_is_rejected() {
        let settings = Settings::from_json(r#"{ "timing": { "gap": 1e20 } }"#).unwrap();
        let plan = PlaybackPlan::for_pair(440.0, 587.33, PlaybackMode::Ascending, &settings.timing);
        assert_eq!(plan.validate(Waveform::Sine), Err(SynthError::InvalidDuration(1e20)));
        assert_eq!(plan.synthesize(Waveform::Sine), Err(SynthError::InvalidDuration(1e20)));

        let settings = Settings::from_json(r#"{ "timing": { "tone": 1e15 } }"#).unwrap();
        let plan = PlaybackPlan::for_pair(440.0, 587.33, PlaybackMode::Descending, &settings.timing);
        assert_eq!(plan.validate(Waveform::Sine), Err(SynthError::InvalidDuration(1e15)));
        assert!(plan.synthesize(Waveform::Sine).is_err());

        let settings = Settings::from_json(r#"{ "timing": { "harmonic": 1e15 } }"#).unwrap();
        let plan = PlaybackPlan::for_pair(440.0, 587.33, PlaybackMode::Harmonic, &settings.timing);
        assert!(plan.synthesize(Waveform::Sine).is_err());
    }

    #[test]
    fn parse_modes() {
        assert_eq!("Harmonic".parse::<PlaybackMode>().unwrap(), PlaybackMode::Harmonic);
        assert_eq!("down".parse::<PlaybackMode>().unwrap(), PlaybackMode::Descending);
        assert!("sideways".parse::<PlaybackMode>().is_err());
        for m in PlaybackMode::ALL {
            assert_eq!(m.to_string().parse::<PlaybackMode>().unwrap(), m);
        }
    }
}
