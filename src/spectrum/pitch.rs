//! Dominant-frequency estimation from a complex spectrum.
//!
//! The estimate is the centre frequency of the strongest bin. Bins above
//! Nyquist are not folded back, so a tone above `sample_rate / 2` is
//! reported at its raw index. Mirrored bins of a real window tie exactly,
//! and ties go to the lower index.

use rustfft::num_complex::Complex;
use std::fmt;

/// Dominant frequency of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Frequency in Hz; `0.0` means no detectable pitch.
    pub frequency_hz: f64,
    /// Index of the winning bin.
    pub bin: usize,
    /// Magnitude of the winning bin.
    pub magnitude: f64,
    /// Number of coefficients the estimate was taken from.
    pub bins: usize,
}

impl PitchEstimate {
    /// The "no detectable pitch" result.
    pub fn silent(bins: usize) -> Self {
        Self {
            frequency_hz: 0.0,
            bin: 0,
            magnitude: 0.0,
            bins,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.frequency_hz == 0.0
    }
}

impl fmt::Display for PitchEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} Hz", self.frequency_hz)
    }
}

/// Maps a bin index to its frequency for a spectrum of `bins` coefficients.
pub fn bin_frequency(bin: usize, bins: usize, sample_rate: u32) -> f64 {
    if bins == 0 {
        return 0.0;
    }
    bin as f64 * sample_rate as f64 / bins as f64
}

/// Picks the strongest bin of a spectrum and converts it to Hz.
#[derive(Debug, Clone, Copy)]
pub struct PitchEstimator {
    sample_rate: u32,
}

impl PitchEstimator {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Scans every coefficient for the maximum magnitude.
    ///
    /// Ties go to the lowest index. Empty and all-zero spectra yield
    /// bin 0, i.e. `0.0` Hz. NaN magnitudes never win.
    pub fn estimate(&self, coefficients: &[Complex<f64>]) -> PitchEstimate {
        let mut best_bin = 0;
        let mut best_magnitude = 0.0f64;

        for (i, c) in coefficients.iter().enumerate() {
            let magnitude = c.norm();
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best_bin = i;
            }
        }

        PitchEstimate {
            frequency_hz: bin_frequency(best_bin, coefficients.len(), self.sample_rate),
            bin: best_bin,
            magnitude: best_magnitude,
            bins: coefficients.len(),
        }
    }
}
