//! Offline effect engine for the chirp sound editor.
//!
//! Renders a `SampleBuffer` through the fixed Pitch → Echo → Distort →
//! Volume chain and cuts buffers down to fractional sub-ranges.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod graph;
mod resample;
mod stage;
pub mod stages;
mod trim;

pub use error::EffectError;
pub use graph::{output_len, EffectGraph, ECHO_DELAY_SECONDS, ECHO_REPEATS, ECHO_TAIL_SECONDS};
pub use resample::{read_interpolated, resample_into};
pub use stage::{EffectStage, RenderContext, StageInfo, StageKind};
pub use trim::{extract, sample_indices};
