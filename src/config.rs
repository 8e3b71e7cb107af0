use crate::defaults;
use crate::error::{PitchshError, Result};
use crate::streaming::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub analysis: AnalysisSection,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Analysis loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSection {
    /// Samples per analysis window.
    pub window_size: usize,
    pub poll_interval_ms: u64,
    /// Ring capacity in windows; 0 keeps all captured audio.
    pub ring_windows: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            window_size: defaults::WINDOW_SIZE,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            ring_windows: defaults::RING_WINDOWS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(PitchshError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicitly requested file must exist; the default location may be
    /// absent.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(PitchshError::ConfigFileNotFound {
                path: path.display().to_string(),
            }),
            Some(path) => Self::load(path),
            None => Self::load_or_default(&Self::default_path()?),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PITCHSH_AUDIO_DEVICE → audio.device
    /// - PITCHSH_SAMPLE_RATE → audio.sample_rate
    /// - PITCHSH_POLL_INTERVAL_MS → analysis.poll_interval_ms
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("PITCHSH_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(rate) = std::env::var("PITCHSH_SAMPLE_RATE")
            && let Ok(rate) = rate.trim().parse::<u32>()
        {
            self.audio.sample_rate = rate;
        }

        if let Ok(interval) = std::env::var("PITCHSH_POLL_INTERVAL_MS")
            && let Ok(interval) = interval.trim().parse::<u64>()
        {
            self.analysis.poll_interval_ms = interval;
        }

        self
    }

    /// Reject values the analysis loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be greater than 0"));
        }
        if self.analysis.window_size == 0 {
            return Err(invalid("analysis.window_size", "must be greater than 0"));
        }
        if self.analysis.poll_interval_ms == 0 {
            return Err(invalid("analysis.poll_interval_ms", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.analysis.poll_interval_ms)
    }

    /// Settings for the analysis loop.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            sample_rate: self.audio.sample_rate,
            window_size: self.analysis.window_size,
            poll_interval: self.poll_interval(),
        }
    }

    /// Serialize the effective configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PitchshError::Other(e.to_string()))
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/pitchsh/config.toml on Linux
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("pitchsh").join("config.toml"))
            .ok_or_else(|| PitchshError::Other("Could not determine config directory".to_string()))
    }
}

fn invalid(key: &str, message: &str) -> PitchshError {
    PitchshError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_pitchsh_env() {
        remove_env("PITCHSH_AUDIO_DEVICE");
        remove_env("PITCHSH_SAMPLE_RATE");
        remove_env("PITCHSH_POLL_INTERVAL_MS");
    }

    fn temp_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.analysis.window_size, 48000);
        assert_eq!(config.analysis.poll_interval_ms, 15);
        assert_eq!(config.analysis.ring_windows, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = temp_config(
            r#"
            [audio]
            device = "hw:0,0"
            sample_rate = 44100

            [analysis]
            window_size = 4096
            poll_interval_ms = 30
            ring_windows = 0
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.audio.device, Some("hw:0,0".to_string()));
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.analysis.window_size, 4096);
        assert_eq!(config.analysis.poll_interval_ms, 30);
        assert_eq!(config.analysis.ring_windows, 0);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = temp_config(
            r#"
            [analysis]
            window_size = 8192
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.analysis.window_size, 8192);
        assert_eq!(config.analysis.poll_interval_ms, 15);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_env_override_device() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_pitchsh_env();

        set_env("PITCHSH_AUDIO_DEVICE", "hw:1,0");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.audio.device, Some("hw:1,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);

        clear_pitchsh_env();
    }

    #[test]
    fn test_env_override_numbers() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_pitchsh_env();

        set_env("PITCHSH_SAMPLE_RATE", "44100");
        set_env("PITCHSH_POLL_INTERVAL_MS", " 20 ");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.analysis.poll_interval_ms, 20);

        clear_pitchsh_env();
    }

    #[test]
    fn test_env_override_empty_or_garbage_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_pitchsh_env();

        set_env("PITCHSH_AUDIO_DEVICE", "");
        set_env("PITCHSH_SAMPLE_RATE", "fast");
        set_env("PITCHSH_POLL_INTERVAL_MS", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config, Config::default());

        clear_pitchsh_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = temp_config(
            r#"
            [audio
            device = "broken
        "#,
        );

        let result = Config::load(temp_file.path());

        assert!(matches!(result, Err(PitchshError::Config(_))));
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let Ok(path) = Config::default_path() else {
            return;
        };
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("pitchsh"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_pitchsh_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = temp_config("sample_rate = [");

        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_resolve_rejects_missing_explicit_path() {
        let missing_path = Path::new("/tmp/nonexistent_pitchsh_config_67890.toml");

        let result = Config::resolve(Some(missing_path));

        assert!(matches!(result, Err(PitchshError::ConfigFileNotFound { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.analysis.window_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("analysis.window_size"));

        let mut config = Config::default();
        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_analysis_config_mirrors_sections() {
        let mut config = Config::default();
        config.audio.sample_rate = 22050;
        config.analysis.window_size = 2048;
        config.analysis.poll_interval_ms = 40;

        let analysis = config.analysis_config();

        assert_eq!(analysis.sample_rate, 22050);
        assert_eq!(analysis.window_size, 2048);
        assert_eq!(analysis.poll_interval, Duration::from_millis(40));
    }

    #[test]
    fn test_toml_round_trip_preserves_config() {
        let mut config = Config::default();
        config.audio.device = Some("pulse".to_string());

        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }
}
