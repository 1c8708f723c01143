//! File formats for the chirp sound editor.
//!
//! Decodes WAV files into mono `SampleBuffer`s and writes buffers back out
//! as 16-bit PCM.

mod wav_format;

pub use wav_format::{buffer_to_wav, load_wav, write_wav};

/// Error type for format parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    #[error("invalid WAV header")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// Encoding the reader does not handle
    #[error("unsupported WAV encoding: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
