//! Headless edit session for the chirp sound editor.
//!
//! Owns the sound being edited, its undo history, effect renders in flight
//! and playback, behind one API that a GUI or the CLI can drive.

mod config;
mod history;
mod host;
mod playback;
mod render;
mod session;

pub use config::{ConfigError, OutputKind, SessionConfig};
pub use history::History;
pub use host::{HostError, MemoryHost, SoundHost};
pub use playback::{output_factory, OutputFactory, Playback, PlaybackListener, SilentListener};
pub use render::RenderTask;
pub use session::{EditSession, PendingKind, PlaybackState, SessionError};

// Re-export common types so callers don't need chirp-ir/chirp-audio directly.
pub use chirp_audio::{AudioError, AudioOutput, NullOutput};
pub use chirp_ir::{Edit, Effect, SampleBuffer, SoundId, TrimRange};
