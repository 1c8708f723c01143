//! Audio output trait and error types.

/// Error type for audio operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
}

/// Trait for mono audio output backends.
pub trait AudioOutput {
    /// Device sample rate.
    fn sample_rate(&self) -> u32;

    /// Queue samples for output, blocking until all of them are accepted.
    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError>;

    /// Samples accepted by `write` but not yet played.
    fn queued(&self) -> usize {
        0
    }

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop playback, discarding nothing already played.
    fn stop(&mut self) -> Result<(), AudioError>;
}
