//! pitchsh - Live pitch detection from an audio input device
//!
//! Captures mono f32 audio, keeps the most recent samples in a bounded
//! ring, and periodically reports the dominant frequency of the newest
//! analysis window.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod spectrum;
pub mod streaming;

// Composition root - needs live capture and the CLI stack
#[cfg(all(feature = "cpal-audio", feature = "cli"))]
pub mod app;

// Core traits (source → analysis → sink)
pub use audio::recorder::AudioSource;
pub use streaming::{CollectorSink, PitchSink, StdoutSink};

// Analysis
pub use spectrum::{PitchEstimate, PitchEstimator, SpectralAnalyzer};
pub use streaming::{AnalysisConfig, AnalysisLoop, CancellationToken, SampleBuffer};

// Monitor
pub use monitor::{Monitor, MonitorConfig, MonitorHandle, MonitorReport};

// Error handling
pub use error::{DecodeError, PitchshError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
