//! Built-in effect stages.

mod distort;
mod echo;
mod passthrough;
mod pitch;
mod volume;

use alloc::boxed::Box;
use chirp_ir::EffectParams;

use crate::stage::{EffectStage, StageKind};

pub use distort::Distort;
pub use echo::Echo;
pub use passthrough::Passthrough;
pub use pitch::Pitch;
pub use volume::Volume;

/// Create the stage for `kind` configured from `params`.
///
/// A stage whose parameter is neutral becomes a `Passthrough`, so the
/// chain always has one connected link per slot.
pub fn create_stage(kind: StageKind, params: &EffectParams) -> Box<dyn EffectStage> {
    match kind {
        StageKind::Pitch if params.pitch_active() => Box::new(Pitch::new(params.pitch_shift)),
        StageKind::Echo if params.echo_active() => Box::new(Echo::new(params.echo_decay)),
        StageKind::Distort if params.distort_active() => {
            Box::new(Distort::new(params.distort_amount))
        }
        StageKind::Volume if params.volume_active() => Box::new(Volume::new(params.volume_scale)),
        _ => Box::new(Passthrough),
    }
}
