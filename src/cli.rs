//! Command-line interface for pitchsh
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live pitch detection from an audio input device
#[derive(Parser, Debug)]
#[command(
    name = "pitchsh",
    version,
    about = "Live pitch detection from an audio input device"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: lifecycle, -vv: per-tick diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Capture sample rate in Hz (default: 48000)
    #[arg(long, short = 'r', value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Analysis window in samples (default: 48000)
    #[arg(long, short = 'w', value_name = "SAMPLES")]
    pub window: Option<usize>,

    /// Analysis polling interval (default: 15ms). Examples: 15ms, 100ms, 1s
    #[arg(long, short = 'i', value_name = "DURATION", value_parser = parse_interval_ms)]
    pub interval: Option<u64>,
}

/// Parse a polling interval into milliseconds.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`15ms`, `1s`, `1s500ms`).
fn parse_interval_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

impl Cli {
    /// Apply command-line overrides on top of file and env configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
        if let Some(rate) = self.sample_rate {
            config.audio.sample_rate = rate;
        }
        if let Some(window) = self.window {
            config.analysis.window_size = window;
        }
        if let Some(interval) = self.interval {
            config.analysis.poll_interval_ms = interval;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration (file, env and flags merged)
    Show,
}
