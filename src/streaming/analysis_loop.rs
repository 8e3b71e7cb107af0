//! Periodic analysis loop.
//!
//! Every poll interval the loop snapshots the shared buffer and runs
//! decode → window → FFT → peak pick, handing the estimate to a sink.
//! It acts on whatever is newest at tick time; there is no catch-up for
//! missed intervals and no timeout on a slow tick.

use crate::audio::decoder;
use crate::defaults;
use crate::error::DecodeError;
use crate::spectrum::{PitchEstimate, PitchEstimator, SpectralAnalyzer};
use crate::streaming::cancel::CancellationToken;
use crate::streaming::sample_buffer::SampleBuffer;
use crate::streaming::sink::PitchSink;
use crate::streaming::window;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the analysis loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Sample rate used to map bins to Hz.
    pub sample_rate: u32,
    /// Number of most recent samples analysed per tick.
    pub window_size: usize,
    /// Delay between ticks.
    pub poll_interval: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_size: defaults::WINDOW_SIZE,
            poll_interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal.
    Stopped,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks started.
    pub ticks: u64,
    /// Estimates handed to the sink successfully.
    pub emitted: u64,
    /// Ticks skipped because the snapshot did not decode.
    pub skipped: u64,
    /// Estimates the sink rejected.
    pub sink_errors: u64,
}

/// Consumer side of the sample buffer.
pub struct AnalysisLoop {
    config: AnalysisConfig,
    buffer: Arc<SampleBuffer>,
    analyzer: SpectralAnalyzer,
    estimator: PitchEstimator,
    sink: Box<dyn PitchSink>,
    cancel: CancellationToken,
    state: LoopState,
    stats: LoopStats,
}

impl AnalysisLoop {
    pub fn new(
        config: AnalysisConfig,
        buffer: Arc<SampleBuffer>,
        sink: Box<dyn PitchSink>,
        cancel: CancellationToken,
    ) -> Self {
        let estimator = PitchEstimator::new(config.sample_rate);
        Self {
            config,
            buffer,
            analyzer: SpectralAnalyzer::new(),
            estimator,
            sink,
            cancel,
            state: LoopState::Running,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Analyses the newest window once, without touching the sink.
    pub fn tick(&mut self) -> Result<PitchEstimate, DecodeError> {
        let snapshot = self.buffer.snapshot_with_generation();
        let samples = decoder::decode(&snapshot.bytes)?;
        let window = window::extract(&samples, self.config.window_size);
        let spectrum = self.analyzer.transform(window);
        let estimate = self.estimator.estimate(&spectrum);

        log::debug!(
            "tick: generation={} window={} bin={} magnitude={:.3} -> {}",
            snapshot.generation,
            window.len(),
            estimate.bin,
            estimate.magnitude,
            estimate
        );

        Ok(estimate)
    }

    fn run_tick(&mut self) {
        self.stats.ticks += 1;
        match self.tick() {
            Ok(estimate) => match self.sink.emit(&estimate) {
                Ok(()) => self.stats.emitted += 1,
                Err(e) => {
                    self.stats.sink_errors += 1;
                    log::warn!("[{}] failed to emit estimate: {}", self.sink.name(), e);
                }
            },
            Err(e) => {
                self.stats.skipped += 1;
                log::warn!("Skipping tick: {}", e);
            }
        }
    }

    /// Runs ticks until the cancellation token is raised.
    ///
    /// The token is checked before the wait and again before any work, so
    /// no tick starts after cancellation has been observed. Returns once
    /// the loop is [`LoopState::Stopped`]; calling it again is a no-op.
    pub fn run(&mut self) -> LoopStats {
        if self.state == LoopState::Stopped {
            return self.stats;
        }

        log::info!(
            "Analysis started: window={} samples, rate={}Hz, interval={:?}",
            self.config.window_size,
            self.config.sample_rate,
            self.config.poll_interval
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            thread::sleep(self.config.poll_interval);
            if self.cancel.is_cancelled() {
                break;
            }
            self.run_tick();
        }

        self.state = LoopState::Stopped;
        log::info!(
            "Analysis stopped after {} ticks ({} skipped)",
            self.stats.ticks,
            self.stats.skipped
        );
        self.stats
    }

    /// Runs the loop on a dedicated thread.
    pub fn spawn(mut self) -> std::io::Result<JoinHandle<LoopStats>> {
        thread::Builder::new()
            .name("pitchsh-analysis".to_string())
            .spawn(move || self.run())
    }
}
