//! Echo stage: a delay line repeating the signal a fixed number of times.
//!
//! Repeat `k` arrives `k * 0.5 s` after the dry signal, scaled by
//! `(0.5 * decay)^k`. Repeats that would land past the output are dropped;
//! the graph reserves the tail so the audible ones fit.

use crate::graph::{ECHO_DELAY_SECONDS, ECHO_REPEATS};
use crate::stage::{EffectStage, RenderContext, StageInfo};

static INFO: StageInfo = StageInfo {
    name: "Echo",
    short_name: "Echo",
    neutral: 0.0,
};

pub struct Echo {
    decay: f32,
}

impl Echo {
    pub fn new(decay: f32) -> Self {
        Self { decay }
    }

    /// Gain applied per repeat.
    pub fn feedback(&self) -> f32 {
        0.5 * self.decay
    }
}

impl EffectStage for Echo {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn process(&self, input: &[f32], output: &mut [f32], ctx: &RenderContext) {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        output[n..].fill(0.0);

        let delay = ((ECHO_DELAY_SECONDS * ctx.sample_rate as f64) as usize).max(1);
        let feedback = self.feedback();
        let mut gain = 1.0f32;
        for repeat in 1..=ECHO_REPEATS {
            gain *= feedback;
            let offset = delay * repeat;
            if offset >= output.len() {
                break;
            }
            for (out, &dry) in output[offset..].iter_mut().zip(input.iter()) {
                *out += dry * gain;
            }
        }
    }
}
