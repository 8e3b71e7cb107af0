//! Default configuration constants for pitchsh.
//!
//! Shared by the config layer, the capture sources and the analysis loop so
//! that every component agrees on the same audio layout.

/// Default capture sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48000;

/// Default analysis window length in samples.
///
/// One second of audio at the default rate, giving a bin width of 1 Hz.
pub const WINDOW_SIZE: usize = 48000;

/// Default polling interval of the analysis loop in milliseconds.
///
/// Far shorter than the window duration so detection is not delayed,
/// long enough to avoid busy-spinning.
pub const POLL_INTERVAL_MS: u64 = 15;

/// Width of one encoded sample: little-endian IEEE-754 single precision.
pub const SAMPLE_WIDTH: usize = 4;

/// Ring buffer capacity, in analysis windows.
///
/// `0` keeps every captured byte for the lifetime of the process.
pub const RING_WINDOWS: usize = 4;

/// Result line prefix written by the stdout sink.
pub const RESULT_PREFIX: &str = "Detected pitch:";
