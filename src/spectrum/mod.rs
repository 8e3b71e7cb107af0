//! Frequency-domain analysis: FFT and peak picking.

pub mod analyzer;
pub mod pitch;

pub use analyzer::SpectralAnalyzer;
pub use pitch::{PitchEstimate, PitchEstimator, bin_frequency};
