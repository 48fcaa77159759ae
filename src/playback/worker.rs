//! Background playback thread.
//!
//! The worker owns the audio sink for its whole life: the sink is opened
//! on the worker thread, so platform outputs that cannot cross threads
//! still work. Requests arriving while a sequence is still sounding are
//! dropped, so two sequences never overlap.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::dsp::oscillator::Waveform;
use crate::error::{PlaybackError, TrainerError};

use super::{AudioSink, Cue, PlaybackPlan};

struct Job {
    plan: PlaybackPlan,
    waveform: Waveform,
}

pub struct PlaybackWorker {
    jobs: Option<mpsc::Sender<Job>>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackWorker {
    /// Start the worker thread and open the sink on it.
    ///
    /// Returns the sink's open error if it fails.
    pub fn spawn<S, F>(open: F) -> Result<Self, PlaybackError>
    where
        S: AudioSink + 'static,
        F: FnOnce() -> Result<S, PlaybackError> + Send + 'static,
    {
        let (send_job, recv_job) = mpsc::channel::<Job>();
        let (send_ready, recv_ready) = mpsc::sync_channel::<Result<(), PlaybackError>>(1);
        let busy = Arc::new(AtomicBool::new(false));

        let handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn({
                let busy = Arc::clone(&busy);
                move || {
                    let mut sink = match open() {
                        Ok(sink) => {
                            let _ = send_ready.send(Ok(()));
                            sink
                        }
                        Err(e) => {
                            let _ = send_ready.send(Err(e));
                            return;
                        }
                    };
                    log::info!("playback worker started");
                    for job in recv_job {
                        if let Err(e) = perform(&mut sink, &job) {
                            log::error!("playback failed: {e}");
                        }
                        busy.store(false, Ordering::Release);
                    }
                    log::info!("playback worker stopped");
                }
            })?;

        match recv_ready.recv() {
            Ok(Ok(())) => Ok(PlaybackWorker {
                jobs: Some(send_job),
                busy,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => Err(PlaybackError::WorkerGone),
        }
    }

    /// Queue a plan for playback.
    ///
    /// Returns `Ok(false)` without queueing when a sequence is still in
    /// flight. Plans that violate the synthesizer contract are rejected
    /// here rather than on the worker.
    pub fn play(&self, plan: &PlaybackPlan, waveform: Waveform) -> Result<bool, TrainerError> {
        plan.validate(waveform)?;
        if self.busy.swap(true, Ordering::AcqRel) {
            log::warn!("playback already in progress, ignoring request");
            return Ok(false);
        }
        let job = Job {
            plan: plan.clone(),
            waveform,
        };
        let sent = self.jobs.as_ref().map(|jobs| jobs.send(job).is_ok());
        if sent != Some(true) {
            self.busy.store(false, Ordering::Release);
            return Err(PlaybackError::WorkerGone.into());
        }
        Ok(true)
    }

    /// True while a sequence is being synthesized or is still sounding.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Block until the current sequence finishes or `timeout` elapses.
    /// Returns whether the worker is idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

impl Drop for PlaybackWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Synthesize and sequence one job, returning once the last sound ends.
fn perform<S: AudioSink>(sink: &mut S, job: &Job) -> Result<(), TrainerError> {
    let cues = job.plan.synthesize(job.waveform)?;
    let mut sounding_until = Instant::now();
    for cue in &cues {
        match cue {
            Cue::Sound(buffer) => {
                sink.play(buffer)?;
                sounding_until = sounding_until.max(Instant::now() + buffer.duration());
            }
            Cue::Wait(d) => thread::sleep(*d),
        }
    }
    let now = Instant::now();
    if sounding_until > now {
        thread::sleep(sounding_until - now);
    }
    Ok(())
}
