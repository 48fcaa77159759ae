//! DSP — tone synthesis, mixing and WAV rendering.
//!
//! Every tone is rendered completely into memory before it is played;
//! nothing here streams.

pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
pub mod tone;
