//! Pitch monitor that runs from startup until cancellation.
//!
//! Wires an [`AudioSource`] and a [`PitchSink`] through the shared sample
//! buffer: one capture thread appends, one analysis thread polls.

use crate::audio::recorder::AudioSource;
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::streaming::{
    AnalysisConfig, AnalysisLoop, BufferStats, CancellationToken, CaptureHandle, CaptureOutcome,
    CaptureProducer, LoopStats, PitchSink, SampleBuffer,
};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Configuration for the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Analysis loop settings. The sample rate is replaced by the rate the
    /// audio source reports once it is known.
    pub analysis: AnalysisConfig,
    /// Ring capacity in analysis windows; 0 means unbounded.
    pub ring_windows: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            ring_windows: defaults::RING_WINDOWS,
        }
    }
}

impl From<&Config> for MonitorConfig {
    fn from(config: &Config) -> Self {
        Self {
            analysis: config.analysis_config(),
            ring_windows: config.analysis.ring_windows,
        }
    }
}

/// What the monitor did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    pub capture: CaptureOutcome,
    pub analysis: LoopStats,
    pub buffer: BufferStats,
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    cancel: CancellationToken,
    capture: CaptureHandle,
    analysis: JoinHandle<LoopStats>,
    buffer: Arc<SampleBuffer>,
}

impl MonitorHandle {
    /// Token that stops both threads when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true until cancellation has been requested.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Requests cancellation and waits for both threads.
    pub fn stop(self) -> MonitorReport {
        self.cancel.cancel();
        self.wait()
    }

    /// Waits for both threads without requesting cancellation.
    ///
    /// Returns once something else cancels the token: a signal handler, a
    /// capture failure or an exhausted finite source.
    pub fn wait(self) -> MonitorReport {
        let capture = self.capture.join();
        let analysis = self.analysis.join().unwrap_or_else(|panic_info| {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            log::error!("Analysis thread panicked: {msg}");
            LoopStats::default()
        });

        MonitorReport {
            capture,
            analysis,
            buffer: self.buffer.stats(),
        }
    }
}

/// Live pitch monitor: AudioSource → SampleBuffer → AnalysisLoop → PitchSink.
pub struct Monitor {
    config: MonitorConfig,
    cancel: CancellationToken,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned token instead of a fresh one.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Starts capture and analysis.
    ///
    /// Fails if the audio source cannot be started or a thread cannot be
    /// spawned. In the latter case capture is cancelled again before
    /// returning.
    pub fn start<A>(self, audio_source: A, sink: Box<dyn PitchSink>) -> Result<MonitorHandle>
    where
        A: AudioSource + 'static,
    {
        let mut analysis_config = self.config.analysis;
        let source_rate = audio_source.sample_rate();
        if source_rate != analysis_config.sample_rate {
            log::info!(
                "Using source sample rate {}Hz instead of configured {}Hz",
                source_rate,
                analysis_config.sample_rate
            );
            analysis_config.sample_rate = source_rate;
        }

        let buffer = Arc::new(SampleBuffer::for_windows(
            analysis_config.window_size,
            self.config.ring_windows,
        ));
        match buffer.capacity() {
            Some(bytes) => log::debug!("Sample ring holds {} bytes", bytes),
            None => log::debug!("Sample buffer is unbounded"),
        }

        let capture = CaptureProducer::new(
            audio_source,
            Arc::clone(&buffer),
            self.cancel.clone(),
            analysis_config.poll_interval,
        )
        .start()?;

        let analysis = AnalysisLoop::new(
            analysis_config,
            Arc::clone(&buffer),
            sink,
            self.cancel.clone(),
        );
        let analysis = match analysis.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                self.cancel.cancel();
                capture.join();
                return Err(e.into());
            }
        };

        Ok(MonitorHandle {
            cancel: self.cancel,
            capture,
            analysis,
            buffer,
        })
    }
}
