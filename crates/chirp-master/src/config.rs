//! Session configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which audio output playback opens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Default CPAL device.
    #[default]
    Cpal,
    /// Real-time paced output that plays into nothing.
    Null,
}

/// Tunables for an `EditSession`.
///
/// ```toml
/// progress_hz = 30
/// default_trim_start = 0.1
/// output = "null"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Progress callbacks per second of playback.
    pub progress_hz: u32,
    /// Trim markers placed when trim mode is entered.
    pub default_trim_start: f64,
    pub default_trim_end: f64,
    /// Samples summarized by each waveform level.
    pub rms_chunk_size: usize,
    /// Start playback after every committed edit.
    pub autoplay: bool,
    pub output: OutputKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_hz: 60,
            default_trim_start: 0.05,
            default_trim_end: 0.95,
            rms_chunk_size: chirp_ir::DEFAULT_CHUNK_SIZE,
            autoplay: true,
            output: OutputKind::Cpal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_hz == 0 {
            return Err(ConfigError::Invalid("progress_hz must be positive".into()));
        }
        if self.rms_chunk_size == 0 {
            return Err(ConfigError::Invalid("rms_chunk_size must be positive".into()));
        }
        let (start, end) = (self.default_trim_start, self.default_trim_end);
        if !(0.0..1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start >= end {
            return Err(ConfigError::Invalid(format!(
                "default trim {}..{} must satisfy 0 <= start < end <= 1",
                start, end
            )));
        }
        Ok(())
    }
}
