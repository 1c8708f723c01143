//! Pitch stage: changes pitch by changing the playback rate.
//!
//! The source is read `ratio` samples per output sample, so raising the
//! pitch shortens the sound at a fixed sample rate.

use crate::resample::resample_into;
use crate::stage::{EffectStage, RenderContext, StageInfo};

static INFO: StageInfo = StageInfo {
    name: "Pitch",
    short_name: "Pitch",
    neutral: 1.0,
};

pub struct Pitch {
    ratio: f32,
}

impl Pitch {
    pub fn new(ratio: f32) -> Self {
        Self { ratio }
    }
}

impl EffectStage for Pitch {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn process(&self, input: &[f32], output: &mut [f32], _ctx: &RenderContext) {
        resample_into(input, self.ratio as f64, 0.0, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_ir::SEMITONE_RATIO;

    fn ctx(len: usize) -> RenderContext {
        RenderContext { sample_rate: 1000, output_len: len }
    }

    #[test]
    fn unit_ratio_is_identity() {
        let input = [0.1f32, 0.2, -0.3, 0.4];
        let mut out = [0.0f32; 4];
        Pitch::new(1.0).process(&input, &mut out, &ctx(4));
        assert_eq!(out, input);
    }

    #[test]
    fn octave_up_reads_every_other_sample() {
        let input = [0.0f32, 0.1, 0.2, 0.3, 0.4, 0.5];
        let mut out = [0.0f32; 3];
        Pitch::new(2.0).process(&input, &mut out, &ctx(3));
        assert_eq!(out, [0.0, 0.2, 0.4]);
    }

    #[test]
    fn pitch_down_interpolates_and_pads() {
        let input = [0.0f32, 1.0];
        let mut out = [9.0f32; 5];
        Pitch::new(0.5).process(&input, &mut out, &ctx(5));
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[2], 1.0);
        assert!((out[3] - 0.5).abs() < 1e-6);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn semitone_up_is_smooth_on_ramp() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let mut out = vec![0.0f32; 90];
        Pitch::new(SEMITONE_RATIO).process(&input, &mut out, &ctx(90));
        for (i, &v) in out.iter().enumerate() {
            let expected = i as f32 * SEMITONE_RATIO / 100.0;
            assert!((v - expected).abs() < 1e-4, "sample {}: {} vs {}", i, v, expected);
        }
    }
}
