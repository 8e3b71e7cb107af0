use crate::defaults::RESULT_PREFIX;
use crate::error::{PitchshError, Result};
use crate::spectrum::PitchEstimate;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Pluggable output for pitch estimates.
/// Pairs with AudioSource for input - this handles the analysis output.
pub trait PitchSink: Send + 'static {
    /// Handle one estimate. Called once per completed tick.
    fn emit(&mut self, estimate: &PitchEstimate) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes `Detected pitch: <value> Hz` lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl PitchSink for StdoutSink {
    fn emit(&mut self, estimate: &PitchEstimate) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", format_result_line(estimate))?;
        stdout.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// The human-readable result line for one estimate.
pub fn format_result_line(estimate: &PitchEstimate) -> String {
    format!("{} {}", RESULT_PREFIX, estimate)
}

/// Collects estimates in memory; clones of [`CollectorSink::handle`] see
/// everything emitted so far.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    collected: Arc<Mutex<Vec<PitchEstimate>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected estimates.
    pub fn handle(&self) -> Arc<Mutex<Vec<PitchEstimate>>> {
        Arc::clone(&self.collected)
    }

    /// Copy of everything collected so far.
    pub fn estimates(&self) -> Vec<PitchEstimate> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PitchSink for CollectorSink {
    fn emit(&mut self, estimate: &PitchEstimate) -> Result<()> {
        self.collected
            .lock()
            .map_err(|e| PitchshError::Sink {
                message: format!("Failed to lock collector: {}", e),
            })?
            .push(*estimate);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
