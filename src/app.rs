//! Pitch monitor application entry point.
//!
//! Chooses the audio source (microphone, or WAV data on stdin), starts the
//! monitor and translates Ctrl+C into cancellation.

use crate::audio::capture::{CpalAudioSource, suppress_audio_warnings};
use crate::audio::recorder::AudioSource;
use crate::audio::wav::WavAudioSource;
use crate::config::Config;
use crate::error::{PitchshError, Result};
use crate::monitor::{Monitor, MonitorConfig, MonitorReport};
use crate::streaming::{CancellationToken, CaptureOutcome, StdoutSink};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Where the monitor reads audio from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Live capture from an input device.
    Microphone,
    /// WAV data piped on stdin, replayed in real time.
    Pipe,
}

impl InputMode {
    /// Pipe mode when stdin is redirected, microphone otherwise.
    pub fn detect() -> Self {
        if std::io::stdin().is_terminal() {
            Self::Microphone
        } else {
            Self::Pipe
        }
    }
}

/// Run the monitor until Ctrl+C, a capture failure, or the end of piped input.
pub async fn run_monitor(config: Config, mode: InputMode, quiet: bool) -> Result<MonitorReport> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    let audio_source: Box<dyn AudioSource> = match mode {
        InputMode::Microphone => Box::new(CpalAudioSource::new(
            config.audio.device.as_deref(),
            config.audio.sample_rate,
        )?),
        InputMode::Pipe => Box::new(WavAudioSource::from_stdin()?),
    };

    if !quiet && mode == InputMode::Microphone {
        eprintln!("{}", "Listening... (Ctrl+C to stop)".dimmed());
    }

    let cancel = CancellationToken::new();
    let handle = Monitor::new(MonitorConfig::from(&config))
        .with_cancellation(cancel.clone())
        .start(audio_source, Box::new(StdoutSink))?;

    let interrupt = tokio::spawn(wait_for_interrupt(cancel));

    let report = tokio::task::spawn_blocking(move || handle.wait())
        .await
        .map_err(|e| PitchshError::Other(format!("Monitor task failed: {}", e)))?;
    interrupt.abort();

    log::info!(
        "Monitor stopped: {} ticks, {} emitted, {} skipped, {} bytes captured",
        report.analysis.ticks,
        report.analysis.emitted,
        report.analysis.skipped,
        report.buffer.total_appended
    );

    if report.capture == CaptureOutcome::Failed {
        return Err(PitchshError::AudioCapture {
            message: "capture stopped unexpectedly (see log for details)".to_string(),
        });
    }

    Ok(report)
}

/// Cancels the monitor on the first Ctrl+C.
async fn wait_for_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            if cancel.cancel() {
                log::info!("Interrupt received, shutting down");
            }
        }
        Err(e) => log::warn!("Failed to wait for Ctrl+C: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_task_can_be_aborted_without_cancelling() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(wait_for_interrupt(cancel.clone()));

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn input_mode_detection_returns_a_mode() {
        let mode = InputMode::detect();
        assert!(matches!(mode, InputMode::Microphone | InputMode::Pipe));
    }
}
