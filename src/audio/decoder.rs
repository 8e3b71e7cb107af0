//! Raw frame codec: little-endian 32-bit float samples.
//!
//! The capture side hands the sample buffer plain bytes; the analysis side
//! turns a snapshot of those bytes back into samples. Value ranges are not
//! checked, NaN and infinities pass through untouched.

use crate::defaults::SAMPLE_WIDTH;
use crate::error::DecodeError;

/// Decodes a raw byte snapshot into samples.
///
/// Fails without producing any output when the length is not a multiple of
/// [`SAMPLE_WIDTH`]; a truncated tail is never silently dropped.
pub fn decode(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    if bytes.len() % SAMPLE_WIDTH != 0 {
        return Err(DecodeError::MalformedLength {
            len: bytes.len(),
            width: SAMPLE_WIDTH,
        });
    }

    Ok(bytes
        .chunks_exact(SAMPLE_WIDTH)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Encodes samples with the same layout [`decode`] expects.
pub fn encode(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * SAMPLE_WIDTH);
    encode_into(samples, &mut bytes);
    bytes
}

/// Appends the encoding of `samples` to `out`.
///
/// Used from capture callbacks to avoid a temporary allocation per block.
pub fn encode_into(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * SAMPLE_WIDTH);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}
