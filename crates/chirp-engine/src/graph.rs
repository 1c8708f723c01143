//! The effect graph: four stage links rendered offline over a whole buffer.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use chirp_ir::{EffectParams, SampleBuffer};

use crate::error::EffectError;
use crate::stage::{EffectStage, RenderContext, StageKind};
use crate::stages::create_stage;

/// Seconds between echo repeats.
pub const ECHO_DELAY_SECONDS: f64 = 0.5;

/// Number of echo repeats after the dry signal.
pub const ECHO_REPEATS: usize = 3;

/// Tail reserved per unit of echo decay.
pub const ECHO_TAIL_SECONDS: f64 = ECHO_REPEATS as f64 * ECHO_DELAY_SECONDS;

/// Longest render the graph will size a buffer for.
const MAX_OUTPUT_SAMPLES: f64 = u32::MAX as f64;

struct Link {
    kind: StageKind,
    stage: Box<dyn EffectStage>,
}

/// A wired Pitch → Echo → Distort → Volume chain for one set of params.
///
/// Building the graph validates the parameters; rendering never mutates
/// the input and always yields a fresh buffer.
pub struct EffectGraph {
    sample_rate: u32,
    params: EffectParams,
    links: Vec<Link>,
}

impl EffectGraph {
    pub fn new(sample_rate: u32, params: EffectParams) -> Result<Self, EffectError> {
        validate(sample_rate, &params)?;
        let links = StageKind::ORDER
            .iter()
            .map(|&kind| Link {
                kind,
                stage: create_stage(kind, &params),
            })
            .collect();
        Ok(Self {
            sample_rate,
            params,
            links,
        })
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stage names in chain order, `Passthrough` for idle slots.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.links.iter().map(|l| l.stage.info().name).collect()
    }

    /// Stage filling `kind`'s slot.
    pub fn stage(&self, kind: StageKind) -> Option<&dyn EffectStage> {
        self.links
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.stage.as_ref())
    }

    /// Render `input` through every link to completion.
    pub fn render(&self, input: &SampleBuffer) -> Result<SampleBuffer, EffectError> {
        if input.sample_rate() != self.sample_rate {
            return Err(EffectError::InvalidEffectParameters(format!(
                "buffer sample rate {} does not match graph rate {}",
                input.sample_rate(),
                self.sample_rate
            )));
        }
        let ctx = RenderContext {
            sample_rate: self.sample_rate,
            output_len: output_len(input.len(), self.sample_rate, &self.params)?,
        };

        let mut current = input.samples().to_vec();
        let mut next = vec![0.0f32; ctx.output_len];
        for link in &self.links {
            link.stage.process(&current, &mut next, &ctx);
            if current.len() != ctx.output_len {
                current = vec![0.0f32; ctx.output_len];
            }
            core::mem::swap(&mut current, &mut next);
        }
        Ok(SampleBuffer::new(current, self.sample_rate))
    }
}

/// Rendered length for `input_len` source samples.
///
/// The echo tail is reserved before the pitch stretch is applied:
/// `ceil((input_len + echo_decay * 1.5 s * rate) / pitch_shift)`.
pub fn output_len(
    input_len: usize,
    sample_rate: u32,
    params: &EffectParams,
) -> Result<usize, EffectError> {
    let tail = params.echo_decay as f64 * ECHO_TAIL_SECONDS * sample_rate as f64;
    let len = libm::ceil((input_len as f64 + tail) / params.pitch_shift as f64);
    if !len.is_finite() || len < 0.0 {
        return Err(EffectError::InvalidEffectParameters(format!(
            "computed output length {} is not a valid sample count",
            len
        )));
    }
    if len > MAX_OUTPUT_SAMPLES {
        return Err(EffectError::InvalidEffectParameters(format!(
            "computed output length {} exceeds {} samples",
            len, MAX_OUTPUT_SAMPLES
        )));
    }
    Ok(len as usize)
}

fn validate(sample_rate: u32, params: &EffectParams) -> Result<(), EffectError> {
    if sample_rate == 0 {
        return Err(EffectError::InvalidEffectParameters(
            "sample rate must be positive".into(),
        ));
    }
    let p = params;
    if !p.pitch_shift.is_finite() || p.pitch_shift <= 0.0 {
        return Err(invalid("pitch_shift", p.pitch_shift));
    }
    if !p.echo_decay.is_finite() || p.echo_decay < 0.0 {
        return Err(invalid("echo_decay", p.echo_decay));
    }
    if !p.distort_amount.is_finite() || p.distort_amount < 0.0 {
        return Err(invalid("distort_amount", p.distort_amount));
    }
    if !p.volume_scale.is_finite() || p.volume_scale < 0.0 {
        return Err(invalid("volume_scale", p.volume_scale));
    }
    Ok(())
}

fn invalid(name: &str, value: f32) -> EffectError {
    EffectError::InvalidEffectParameters(format!("{} out of range: {}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_ir::{Effect, LOUDER_SCALE};

    fn ramp(len: usize, rate: u32) -> SampleBuffer {
        let samples = (0..len).map(|i| ((i % 50) as f32 / 50.0) - 0.5).collect();
        SampleBuffer::new(samples, rate)
    }

    fn render(buf: &SampleBuffer, params: EffectParams) -> SampleBuffer {
        EffectGraph::new(buf.sample_rate(), params)
            .unwrap()
            .render(buf)
            .unwrap()
    }

    #[test]
    fn neutral_graph_is_all_passthrough() {
        let graph = EffectGraph::new(44100, EffectParams::default()).unwrap();
        assert_eq!(graph.stage_names(), ["Passthrough"; 4]);
    }

    #[test]
    fn links_follow_fixed_order() {
        let params = EffectParams {
            pitch_shift: 2.0,
            echo_decay: 0.5,
            distort_amount: 0.5,
            volume_scale: 0.5,
        };
        let graph = EffectGraph::new(44100, params).unwrap();
        assert_eq!(graph.stage_names(), ["Pitch", "Echo", "Distort", "Volume"]);
        assert_eq!(graph.stage(StageKind::Echo).unwrap().info().name, "Echo");
    }

    #[test]
    fn identity_laws_hold_per_stage() {
        let buf = ramp(777, 8000);
        let neutral = [
            EffectParams { pitch_shift: 1.0, ..Default::default() },
            EffectParams { echo_decay: 0.0, ..Default::default() },
            EffectParams { distort_amount: 0.0, ..Default::default() },
            EffectParams { volume_scale: 1.0, ..Default::default() },
        ];
        for params in neutral {
            assert_eq!(render(&buf, params), buf);
        }
    }

    #[test]
    fn render_does_not_touch_input() {
        let buf = ramp(100, 1000);
        let copy = buf.clone();
        let _ = render(&buf, Effect::Robot.params());
        assert_eq!(buf, copy);
    }

    #[test]
    fn echo_tail_is_reserved() {
        let buf = ramp(1000, 1000);
        let out = render(&buf, Effect::Echo.params());
        // 1000 + 0.5 * 1.5 * 1000
        assert!(out.len() >= 1750, "len {}", out.len());
        assert_eq!(out.len(), 1750);
    }

    #[test]
    fn echo_lands_in_reserved_tail() {
        let mut samples = vec![0.0f32; 1000];
        samples[999] = 1.0;
        let buf = SampleBuffer::new(samples, 1000);
        let out = render(&buf, EffectParams { echo_decay: 1.0, ..Default::default() });
        assert_eq!(out.len(), 2500);
        assert!((out.samples()[1499] - 0.5).abs() < 1e-6);
        assert!((out.samples()[1999] - 0.25).abs() < 1e-6);
        assert!((out.samples()[2499] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn pitch_scales_duration() {
        let buf = ramp(1000, 1000);
        assert_eq!(render(&buf, EffectParams { pitch_shift: 2.0, ..Default::default() }).len(), 500);
        assert_eq!(render(&buf, EffectParams { pitch_shift: 0.5, ..Default::default() }).len(), 2000);
        let higher = render(&buf, Effect::Higher.params());
        assert!(higher.len() < 1000 && higher.len() > 900);
    }

    #[test]
    fn volume_applies_after_distortion() {
        let buf = SampleBuffer::new(vec![1.0; 8], 100);
        let params = Effect::Robot.params().with_effect(Effect::Louder);
        let out = render(&buf, params);
        // the shaper maps 1.0 to 1.0; gain lands on top
        for &s in out.samples() {
            assert!((s - LOUDER_SCALE).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_buffer_renders_empty_without_echo() {
        let buf = SampleBuffer::empty(1000);
        assert!(render(&buf, Effect::Louder.params()).is_empty());
        assert_eq!(render(&buf, Effect::Echo.params()).len(), 750);
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let err = EffectGraph::new(0, Effect::Echo.params()).err().unwrap();
        assert!(matches!(err, EffectError::InvalidEffectParameters(_)));
    }

    #[test]
    fn out_of_range_params_are_rejected() {
        let bad = [
            EffectParams { pitch_shift: 0.0, ..Default::default() },
            EffectParams { pitch_shift: -1.0, ..Default::default() },
            EffectParams { echo_decay: -0.5, ..Default::default() },
            EffectParams { distort_amount: f32::NAN, ..Default::default() },
            EffectParams { volume_scale: f32::INFINITY, ..Default::default() },
        ];
        for params in bad {
            assert!(EffectGraph::new(44100, params).is_err(), "{:?}", params);
        }
    }

    #[test]
    fn mismatched_buffer_rate_is_rejected() {
        let graph = EffectGraph::new(44100, Effect::Louder.params()).unwrap();
        assert!(graph.render(&SampleBuffer::silent(10, 22050)).is_err());
    }

    #[test]
    fn huge_tail_overflows_output_length() {
        let params = EffectParams { echo_decay: 1.0e30, ..Default::default() };
        assert!(output_len(10, 44100, &params).is_err());
    }
}
