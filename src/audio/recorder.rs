use crate::audio::decoder;
use crate::defaults;
use crate::error::{PitchshError, Result};

/// Trait for audio source devices.
///
/// Sources deliver raw frames: little-endian 32-bit float mono samples,
/// ready to be appended to the shared sample buffer as-is.
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Drain the bytes captured since the previous call.
    ///
    /// An empty vector means nothing new has arrived yet.
    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    /// Sample rate of the delivered audio in Hz.
    fn sample_rate(&self) -> u32;

    /// Whether a finite source (file, pipe) has delivered everything.
    ///
    /// Live devices never run out.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl AudioSource for Box<dyn AudioSource> {
    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        (**self).read_bytes()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    payload: Vec<u8>,
    remaining_reads: Option<usize>,
    sample_rate: u32,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a mock that returns 160 encoded silent samples per read.
    pub fn new() -> Self {
        Self {
            is_started: false,
            payload: decoder::encode(&[0.0; 160]),
            remaining_reads: None,
            sample_rate: defaults::SAMPLE_RATE,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return these samples (encoded) on every read.
    pub fn with_samples(mut self, samples: &[f32]) -> Self {
        self.payload = decoder::encode(samples);
        self
    }

    /// Configure the mock to return these exact bytes on every read.
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.payload = bytes;
        self
    }

    /// Make the source finite: after `reads` reads it is exhausted.
    pub fn with_read_limit(mut self, reads: usize) -> Self {
        self.remaining_reads = Some(reads);
        self
    }

    /// Configure the reported sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    fn failure(&self) -> PitchshError {
        PitchshError::AudioCapture {
            message: self.error_message.clone(),
        }
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(self.failure());
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        if self.should_fail_read {
            return Err(self.failure());
        }
        match self.remaining_reads.as_mut() {
            Some(0) => Ok(Vec::new()),
            Some(n) => {
                *n -= 1;
                Ok(self.payload.clone())
            }
            None => Ok(self.payload.clone()),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_exhausted(&self) -> bool {
        self.remaining_reads == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_audio_source_returns_configured_samples() {
        let mut source = MockAudioSource::new().with_samples(&[0.5, -0.5]);

        let bytes = source.read_bytes().unwrap();

        assert_eq!(decoder::decode(&bytes).unwrap(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_mock_audio_source_returns_default_silence() {
        let mut source = MockAudioSource::new();

        let samples = decoder::decode(&source.read_bytes().unwrap()).unwrap();

        assert_eq!(samples.len(), 160);
        assert!(samples.iter().all(|&s| s == 0.0));
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_mock_audio_source_read_limit_makes_it_finite() {
        let mut source = MockAudioSource::new().with_read_limit(2);

        assert!(!source.read_bytes().unwrap().is_empty());
        assert!(!source.is_exhausted());
        assert!(!source.read_bytes().unwrap().is_empty());
        assert!(source.is_exhausted());
        assert!(source.read_bytes().unwrap().is_empty());
        assert!(source.read_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_mock_audio_source_returns_custom_read_error() {
        let mut source = MockAudioSource::new()
            .with_read_failure()
            .with_error_message("buffer overflow");

        match source.read_bytes() {
            Err(PitchshError::AudioCapture { message }) => {
                assert_eq!(message, "buffer overflow");
            }
            other => panic!("Expected AudioCapture error, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_audio_source_start_and_stop() {
        let mut source = MockAudioSource::new();
        assert!(!source.is_started());

        source.start().unwrap();
        assert!(source.is_started());

        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_audio_source_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();
        assert!(source.start().is_err());
        assert!(!source.is_started());
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut source: Box<dyn AudioSource> =
            Box::new(MockAudioSource::new().with_sample_rate(44100).with_read_limit(1));

        assert_eq!(source.sample_rate(), 44100);
        source.start().unwrap();
        assert!(!source.read_bytes().unwrap().is_empty());
        assert!(source.is_exhausted());
    }
}
