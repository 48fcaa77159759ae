use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::dsp::tone::{CHANNELS, PcmBuffer, SAMPLE_RATE};
use crate::error::PlaybackError;

use super::AudioSink;

/// The system's default output device.
///
/// Not `Send`: open it on the thread that plays through it, e.g. via
/// `PlaybackWorker::spawn(RodioOutput::open)`.
pub struct RodioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioOutput {
    pub fn open() -> Result<Self, PlaybackError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
        log::info!("opened default audio output");
        Ok(RodioOutput {
            _stream: stream,
            stream_handle,
        })
    }
}

impl AudioSink for RodioOutput {
    fn play(&mut self, buffer: &PcmBuffer) -> Result<(), PlaybackError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        sink.append(SamplesBuffer::new(
            CHANNELS,
            SAMPLE_RATE,
            buffer.samples().to_vec(),
        ));
        // Keeps playing after the handle is dropped.
        sink.detach();
        Ok(())
    }
}
