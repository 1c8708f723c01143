//! Passthrough stage: the identity link for an inactive slot.
//!
//! Copies input to output unchanged. Output longer than the input (a
//! reserved echo tail) is filled with silence.

use crate::stage::{EffectStage, RenderContext, StageInfo};

static INFO: StageInfo = StageInfo {
    name: "Passthrough",
    short_name: "Pass",
    neutral: 0.0,
};

pub struct Passthrough;

impl EffectStage for Passthrough {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn process(&self, input: &[f32], output: &mut [f32], _ctx: &RenderContext) {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        output[n..].fill(0.0);
    }
}
