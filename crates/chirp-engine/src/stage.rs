//! Effect stage trait.

/// Which slot of the chain a stage fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Pitch,
    Echo,
    Distort,
    Volume,
}

impl StageKind {
    /// Chain order. Pitch runs first so echo timing is measured against the
    /// stretched signal; volume runs last.
    pub const ORDER: [StageKind; 4] = [
        StageKind::Pitch,
        StageKind::Echo,
        StageKind::Distort,
        StageKind::Volume,
    ];
}

/// Static metadata about a stage.
pub struct StageInfo {
    pub name: &'static str,
    pub short_name: &'static str,
    /// Parameter value at which the stage changes nothing.
    pub neutral: f32,
}

/// Fixed facts about one offline render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderContext {
    pub sample_rate: u32,
    /// Length every stage writes, including any reserved echo tail.
    pub output_len: usize,
}

/// One link of the effect chain.
///
/// `process` is a pure function of `input`: it writes exactly
/// `output.len()` samples and keeps no state between calls. `input` may
/// be shorter or longer than `output` (the first link sees the source
/// buffer); missing input reads as silence.
pub trait EffectStage: Send + Sync {
    fn info(&self) -> &StageInfo;
    fn process(&self, input: &[f32], output: &mut [f32], ctx: &RenderContext);
}
