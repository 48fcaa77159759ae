pub mod dsp;
pub mod error;
pub mod playback;
pub mod settings;
pub mod theory;
pub mod trial;

use crate::dsp::oscillator::Waveform;
use crate::dsp::tone::{ToneSpec, synthesize};
use crate::error::TrainerError;
use crate::playback::{PlaybackMode, PlaybackPlan, PlaybackTiming};
use crate::settings::Settings;
use crate::trial::Session;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// Render a root/target pair to WAV bytes, with waveform and mode given by name.
pub fn render_pair_wav(
    root: f64,
    target: f64,
    mode: &str,
    waveform: &str,
    timing: &PlaybackTiming,
) -> Result<Vec<u8>, TrainerError> {
    let mode: PlaybackMode = mode.parse()?;
    let waveform: Waveform = waveform.parse()?;
    let plan = PlaybackPlan::for_pair(root, target, mode, timing);
    dsp::renderer::render_wav(&plan, waveform)
}

/// WASM-exposed: return the crate version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the interval catalog as an array of
/// `{ semitones, name, symbol }` objects.
#[wasm_bindgen]
pub fn interval_catalog() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&theory::INTERVALS[..]).map_err(js_err)
}

/// WASM-exposed: synthesize one tone to interleaved stereo f32 samples.
#[wasm_bindgen]
pub fn render_tone_samples(
    frequency: f64,
    duration: f64,
    waveform: &str,
    volume: f64,
) -> Result<Vec<f32>, JsValue> {
    let waveform: Waveform = waveform.parse().map_err(js_err)?;
    let spec = ToneSpec {
        frequency,
        duration,
        waveform,
        volume,
    };
    Ok(synthesize(&spec).map_err(js_err)?.to_f32())
}

/// WASM-exposed: render a root/target pair to a WAV byte array.
#[wasm_bindgen]
pub fn render_trial_wav(
    root: f64,
    target: f64,
    mode: &str,
    waveform: &str,
) -> Result<Vec<u8>, JsValue> {
    render_pair_wav(root, target, mode, waveform, &PlaybackTiming::default()).map_err(js_err)
}

/// WASM-exposed session for a browser shell. Audio comes back as WAV
/// bytes for the page to play.
#[wasm_bindgen]
pub struct WasmSession {
    session: Session,
    settings: Settings,
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        WasmSession {
            session: Session::new(),
            settings: Settings::default(),
        }
    }

    /// Replace the selection from a settings JSON string.
    pub fn configure(&mut self, settings_json: &str) -> Result<(), JsValue> {
        self.settings = Settings::from_json(settings_json).map_err(js_err)?;
        Ok(())
    }

    /// Pose a new question and return its audio.
    pub fn start_trial(&mut self) -> Result<Vec<u8>, JsValue> {
        let trial = self
            .session
            .start_trial(&self.settings.intervals)
            .map_err(js_err)?;
        self.render(trial.frequencies())
    }

    /// Audio of the live question, or an empty array when none is live.
    pub fn replay(&self) -> Result<Vec<u8>, JsValue> {
        match self.session.replay() {
            Some(freqs) => self.render(freqs),
            None => Ok(Vec::new()),
        }
    }

    /// Judge an answer; returns `{ correct, answer_semitones, answer_name, answer_symbol }`.
    pub fn submit_answer(&mut self, guess: u8) -> Result<JsValue, JsValue> {
        let verdict = self.session.submit_answer(guess).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&verdict).map_err(js_err)
    }

    /// Returns `{ correct, total }`.
    pub fn score(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.score()).map_err(js_err)
    }
}

impl WasmSession {
    fn render(&self, (root, target): (f64, f64)) -> Result<Vec<u8>, JsValue> {
        let plan = PlaybackPlan::for_pair(root, target, self.settings.mode, &self.settings.timing);
        dsp::renderer::render_wav(&plan, self.settings.waveform).map_err(js_err)
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        WasmSession::new()
    }
}
