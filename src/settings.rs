//! User settings: the selection the shell starts with.
//!
//! Stored as JSON. Every field is optional in the file; missing fields
//! fall back to the defaults (all intervals, sine, ascending).

use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::error::SettingsError;
use crate::playback::{PlaybackMode, PlaybackTiming};
use crate::theory::IntervalSet;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub waveform: Waveform,
    pub mode: PlaybackMode,
    pub intervals: IntervalSet,
    pub timing: PlaybackTiming,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// `settings.json` in the platform config directory.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "interval-trainer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}
