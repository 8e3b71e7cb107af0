//! Capture producer: moves raw frames from an audio source into the
//! shared sample buffer on a dedicated thread.
//!
//! Decoupled from analysis timing: the producer never waits on the
//! consumer, it only appends.

use crate::audio::recorder::AudioSource;
use crate::error::Result;
use crate::streaming::cancel::CancellationToken;
use crate::streaming::sample_buffer::SampleBuffer;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Why the capture thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The cancellation token was raised.
    Cancelled,
    /// A finite source delivered everything it had.
    Exhausted,
    /// The source failed; the token was raised on its behalf.
    Failed,
}

/// Capture producer that continuously drains an audio source.
pub struct CaptureProducer<A: AudioSource> {
    audio_source: A,
    buffer: Arc<SampleBuffer>,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl<A: AudioSource + 'static> CaptureProducer<A> {
    pub fn new(
        audio_source: A,
        buffer: Arc<SampleBuffer>,
        cancel: CancellationToken,
        poll_interval: Duration,
    ) -> Self {
        Self {
            audio_source,
            buffer,
            cancel,
            poll_interval,
        }
    }

    /// Starts the source and spawns the capture thread.
    ///
    /// The thread runs until the token is cancelled, the source fails, or a
    /// finite source is exhausted. In the last two cases it raises the token
    /// itself so the analysis loop winds down too.
    pub fn start(mut self) -> Result<CaptureHandle> {
        self.audio_source.start()?;
        log::info!(
            "Capture started at {}Hz, polling every {:?}",
            self.audio_source.sample_rate(),
            self.poll_interval
        );

        let join = thread::Builder::new()
            .name("pitchsh-capture".to_string())
            .spawn(move || self.run())?;

        Ok(CaptureHandle { join })
    }

    fn run(mut self) -> CaptureOutcome {
        let outcome = loop {
            if self.cancel.is_cancelled() {
                break CaptureOutcome::Cancelled;
            }

            match self.audio_source.read_bytes() {
                Ok(bytes) if !bytes.is_empty() => {
                    self.buffer.append(&bytes);
                }
                Ok(_) if self.audio_source.is_exhausted() => {
                    log::info!("Audio source exhausted");
                    self.cancel.cancel();
                    break CaptureOutcome::Exhausted;
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("Audio capture error: {}", e);
                    self.cancel.cancel();
                    break CaptureOutcome::Failed;
                }
            }

            // One drain per interval; sources keep buffering in between.
            // An always-ready source must not spin the thread.
            thread::sleep(self.poll_interval);
        };

        if let Err(e) = self.audio_source.stop() {
            log::warn!("Failed to stop audio source: {}", e);
        }
        log::info!("Capture stopped ({:?})", outcome);
        outcome
    }
}

/// Handle to a running capture thread.
pub struct CaptureHandle {
    join: JoinHandle<CaptureOutcome>,
}

impl CaptureHandle {
    /// Waits for the capture thread to finish.
    pub fn join(self) -> CaptureOutcome {
        self.join.join().unwrap_or_else(|_| {
            log::error!("Capture thread panicked");
            CaptureOutcome::Failed
        })
    }
}
