//! Volume stage: linear gain, applied last in the chain.

use crate::stage::{EffectStage, RenderContext, StageInfo};

static INFO: StageInfo = StageInfo {
    name: "Volume",
    short_name: "Vol",
    neutral: 1.0,
};

pub struct Volume {
    gain: f32,
}

impl Volume {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }
}

impl EffectStage for Volume {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn process(&self, input: &[f32], output: &mut [f32], _ctx: &RenderContext) {
        let n = input.len().min(output.len());
        let g = self.gain;
        for (out, &x) in output[..n].iter_mut().zip(input.iter()) {
            *out = x * g;
        }
        output[n..].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_every_sample() {
        let ctx = RenderContext { sample_rate: 100, output_len: 3 };
        let mut out = [0.0f32; 3];
        Volume::new(1.25).process(&[0.1, -0.4, 0.8], &mut out, &ctx);
        assert!((out[0] - 0.125).abs() < 1e-6);
        assert!((out[1] + 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unit_gain_is_identity() {
        let ctx = RenderContext { sample_rate: 100, output_len: 3 };
        let input = [0.1f32, -0.4, 0.8];
        let mut out = [0.0f32; 3];
        Volume::new(1.0).process(&input, &mut out, &ctx);
        assert_eq!(out, input);
    }
}
