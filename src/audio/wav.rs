//! WAV file audio source for pipe mode.

use crate::audio::decoder;
use crate::audio::recorder::AudioSource;
use crate::error::{PitchshError, Result};
use std::io::Read;
use std::time::Instant;

/// Audio source that replays WAV data as if it were being captured live.
///
/// Only mono files are accepted. Integer formats are scaled to [-1.0, 1.0). Samples are released at the file's own rate, measured
/// from `start()`, unless pacing is disabled.
pub struct WavAudioSource {
    samples: Vec<f32>,
    position: usize,
    sample_rate: u32,
    started_at: Option<Instant>,
    paced: bool,
    chunk_size: usize,
}

impl WavAudioSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| PitchshError::AudioCapture {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        if spec.channels != 1 {
            return Err(PitchshError::AudioFormatMismatch {
                expected: "1 channel".to_string(),
                actual: format!("{} channels", spec.channels),
            });
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| PitchshError::AudioCapture {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

        log::info!(
            "Loaded WAV: {} samples, {}Hz",
            samples.len(),
            spec.sample_rate
        );

        Ok(Self {
            samples,
            position: 0,
            sample_rate: spec.sample_rate,
            started_at: None,
            paced: true,
            // 100ms chunks
            chunk_size: (spec.sample_rate as usize / 10).max(1),
        })
    }

    /// Create from stdin.
    pub fn from_stdin() -> Result<Self> {
        use std::io::Cursor;

        // StdinLock is not Send, so read everything up front
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| PitchshError::AudioCapture {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)))
    }

    /// Release samples as fast as they are read instead of in real time.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Total number of samples in the file.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index one past the last sample that may be released right now.
    fn release_limit(&self) -> usize {
        let due = match (self.paced, self.started_at) {
            (true, Some(started)) => {
                (started.elapsed().as_secs_f64() * self.sample_rate as f64) as usize
            }
            _ => self.position + self.chunk_size,
        };
        due.min(self.samples.len())
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        self.started_at.get_or_insert_with(Instant::now);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = self.release_limit();
        if end <= self.position {
            return Ok(Vec::new());
        }

        let chunk = decoder::encode(&self.samples[self.position..end]);
        self.position = end;
        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}
