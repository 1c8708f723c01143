//! Effect engine error type.

use alloc::string::String;

/// Error returned when an effect graph cannot be built or rendered.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// Sample rate, intensity, or computed output length out of range.
    #[error("invalid effect parameters: {0}")]
    InvalidEffectParameters(String),
}
