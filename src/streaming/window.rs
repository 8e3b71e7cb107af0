//! Fixed-size analysis windowing.

/// Returns the most recent `window_size` samples.
///
/// Shorter histories are returned whole: no zero padding, no error.
pub fn extract(samples: &[f32], window_size: usize) -> &[f32] {
    if samples.len() <= window_size {
        samples
    } else {
        &samples[samples.len() - window_size..]
    }
}
