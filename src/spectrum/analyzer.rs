// Spectral analysis - forward FFT over the current analysis window
//
// The transform length follows the window: during startup, when less than
// a full window has been captured, the FFT shrinks instead of zero-padding.
// No window function is applied, so off-bin tones leak into neighbouring
// bins; locating the peak bin is all the estimator needs.

use rustfft::{FftPlanner, num_complex::Complex};

/// Computes the full complex spectrum of real-valued sample windows.
///
/// Plans are cached by the planner, so repeated windows of the same length
/// only pay for planning once.
pub struct SpectralAnalyzer {
    planner: FftPlanner<f64>,
    scratch: Vec<Complex<f64>>,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            scratch: Vec::new(),
        }
    }

    /// Transforms `window` into one complex coefficient per sample.
    ///
    /// The spectrum is not conjugate-reduced: index `k` and `N - k` are both
    /// present, and the upper half is the exact conjugate of the lower half.
    /// An empty window yields an empty spectrum without planning.
    pub fn transform(&mut self, window: &[f32]) -> Vec<Complex<f64>> {
        if window.is_empty() {
            return Vec::new();
        }

        let fft = self.planner.plan_fft_forward(window.len());

        let mut buffer: Vec<Complex<f64>> = window
            .iter()
            .map(|&sample| Complex::new(sample as f64, 0.0))
            .collect();

        let scratch_len = fft.get_inplace_scratch_len();
        if self.scratch.len() < scratch_len {
            self.scratch.resize(scratch_len, Complex::new(0.0, 0.0));
        }
        fft.process_with_scratch(&mut buffer, &mut self.scratch[..scratch_len]);

        // Real input: X[N-k] == conj(X[k]). Rounding breaks the symmetry by a
        // few ULPs, so restore it and mirrored bins compare exactly equal.
        let n = buffer.len();
        for k in (n / 2 + 1)..n {
            buffer[k] = buffer[n - k].conj();
        }

        buffer
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
