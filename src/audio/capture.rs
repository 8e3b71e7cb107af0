//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::decoder;
use crate::audio::recorder::AudioSource;
use crate::error::{PitchshError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Opening a CPAL host triggers ALSA/JACK/PipeWire chatter on stderr that is
/// harmless but confusing next to the pitch output.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA messages that occur during audio backend probing.
///
/// # Safety
/// Modifies environment variables; call at startup before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through the Mutex in CpalAudioSource,
/// from one thread at a time.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Stream layout the capture path asks for: mono at the configured rate.
fn mono_stream_config(sample_rate: u32) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    }
}

/// Map a stream build failure onto the crate error.
///
/// A device that cannot deliver f32 mono at the configured rate is a format
/// mismatch; there is no fallback to another layout.
fn build_error(err: cpal::BuildStreamError, sample_rate: u32) -> PitchshError {
    match err {
        cpal::BuildStreamError::StreamConfigNotSupported => PitchshError::AudioFormatMismatch {
            expected: format!("f32 mono at {}Hz", sample_rate),
            actual: "unsupported by device".to_string(),
        },
        other => PitchshError::AudioCapture {
            message: format!("Failed to build input stream: {}", other),
        },
    }
}

/// Live capture into raw frames (f32 LE, mono) using CPAL.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<u8>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Open an input device.
    ///
    /// `device_name` must match a device name exactly; `None` uses the host's
    /// default input device.
    pub fn new(device_name: Option<&str>, sample_rate: u32) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();
            match device_name {
                Some(name) => host
                    .input_devices()
                    .map_err(|e| PitchshError::AudioCapture {
                        message: format!("Failed to open input devices: {}", e),
                    })?
                    .find(|dev| dev.name().is_ok_and(|n| n == name))
                    .ok_or_else(|| PitchshError::AudioDeviceNotFound {
                        device: name.to_string(),
                    }),
                None => host
                    .default_input_device()
                    .ok_or_else(|| PitchshError::AudioDeviceNotFound {
                        device: "default".to_string(),
                    }),
            }
        })?;

        if let Ok(name) = device.name() {
            log::info!("Using input device '{}'", name);
        }

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &mono_stream_config(self.sample_rate),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        decoder::encode_into(data, &mut buf);
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| build_error(e, self.sample_rate))
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        let mut stream_guard = self.stream.lock().map_err(|e| PitchshError::AudioCapture {
            message: format!("Failed to lock stream: {}", e),
        })?;
        if stream_guard.is_some() {
            return Ok(());
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| PitchshError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        *stream_guard = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut stream_guard = self.stream.lock().map_err(|e| PitchshError::AudioCapture {
            message: format!("Failed to lock stream: {}", e),
        })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| PitchshError::AudioCapture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = self.buffer.lock().map_err(|e| PitchshError::AudioCapture {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;

        Ok(std::mem::take(&mut *buffer))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
