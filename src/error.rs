use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),
    #[error("Trial error: {0}")]
    Trial(#[from] TrialError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Caller contract violations for the tone synthesizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("frequency must be a positive finite number of Hz, got {0}")]
    InvalidFrequency(f64),
    #[error("duration must be a positive finite number of seconds, got {0}")]
    InvalidDuration(f64),
    #[error("volume must lie in [0, 1], got {0}")]
    InvalidVolume(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrialError {
    #[error("select at least one interval to practise")]
    NoIntervalsSelected,
    #[error("no question is waiting for an answer")]
    NoActiveTrial,
    #[error("interval of {0} semitones is outside 1..=12")]
    InvalidInterval(u8),
    #[error("root note {0} is outside the MIDI range 48..=72")]
    RootOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown waveform '{0}' (expected sine, triangle, sawtooth or square)")]
    Waveform(String),
    #[error("unknown playback mode '{0}' (expected ascending, descending or harmonic)")]
    Mode(String),
    #[error("unknown interval '{0}'")]
    Interval(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to open audio output: {0}")]
    Device(String),
    #[error("playback worker has stopped")]
    WorkerGone,
    #[error("audio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}
