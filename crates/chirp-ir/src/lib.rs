//! Core data types for the chirp sound editor.
//!
//! Every other crate in the workspace speaks in these types: the effect
//! engine renders `SampleBuffer`s, the session keeps them in its history,
//! and the format layer decodes files into them.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod analysis;
mod edit;
mod effects;
mod sample_buffer;
mod trim;

pub use analysis::{chunk_levels, rms_level, DEFAULT_CHUNK_SIZE};
pub use edit::Edit;
pub use effects::{
    Effect, EffectParams, UnknownEffect, LOUDER_SCALE, SEMITONE_RATIO, SOFTER_SCALE,
    TOGGLE_INTENSITY,
};
pub use sample_buffer::SampleBuffer;
pub use trim::TrimRange;

slotmap::new_key_type! {
    /// Key identifying one sound in the host's asset store.
    pub struct SoundId;
}
