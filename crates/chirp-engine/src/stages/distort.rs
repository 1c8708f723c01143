//! Distort stage: soft-clipping waveshaper.
//!
//! `y = (1 + k) x / (1 + k |x|)` with drive `k = 100 * amount`. At
//! amount 0 the curve is the identity; larger drive flattens peaks
//! towards ±1.

use crate::stage::{EffectStage, RenderContext, StageInfo};

static INFO: StageInfo = StageInfo {
    name: "Distort",
    short_name: "Dist",
    neutral: 0.0,
};

const DRIVE_SCALE: f32 = 100.0;

pub struct Distort {
    drive: f32,
}

impl Distort {
    pub fn new(amount: f32) -> Self {
        Self {
            drive: amount * DRIVE_SCALE,
        }
    }

    #[inline]
    fn shape(&self, x: f32) -> f32 {
        let k = self.drive;
        (1.0 + k) * x / (1.0 + k * x.abs())
    }
}

impl EffectStage for Distort {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn process(&self, input: &[f32], output: &mut [f32], _ctx: &RenderContext) {
        let n = input.len().min(output.len());
        for (out, &x) in output[..n].iter_mut().zip(input.iter()) {
            *out = self.shape(x);
        }
        output[n..].fill(0.0);
    }
}
