//! Effect toggles and the parameter set the effect graph renders.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

/// Pitch ratio of one equal-tempered semitone, `2^(1/12)`.
pub const SEMITONE_RATIO: f32 = 1.059_463_1;

/// Intensity an echo or robot toggle switches on with.
pub const TOGGLE_INTENSITY: f32 = 0.5;

/// Gain applied by the "louder" toggle.
pub const LOUDER_SCALE: f32 = 1.25;

/// Gain applied by the "softer" toggle.
pub const SOFTER_SCALE: f32 = 0.75;

/// One of the editor's effect buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Pitch up one semitone (shortens the sound).
    Higher,
    /// Pitch down one semitone (lengthens the sound).
    Lower,
    Echo,
    /// Waveshaping distortion.
    Robot,
    Louder,
    Softer,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::Higher,
        Effect::Lower,
        Effect::Echo,
        Effect::Robot,
        Effect::Louder,
        Effect::Softer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Effect::Higher => "higher",
            Effect::Lower => "lower",
            Effect::Echo => "echo",
            Effect::Robot => "robot",
            Effect::Louder => "louder",
            Effect::Softer => "softer",
        }
    }

    /// Parameters with only this effect switched on.
    pub fn params(self) -> EffectParams {
        EffectParams::default().with_effect(self)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An effect name that matched no toggle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown effect: {0}")]
pub struct UnknownEffect(pub String);

impl FromStr for Effect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "higher" | "chipmunk" => Ok(Effect::Higher),
            "lower" | "monster" => Ok(Effect::Lower),
            "echo" => Ok(Effect::Echo),
            "robot" | "distort" => Ok(Effect::Robot),
            "louder" => Ok(Effect::Louder),
            "softer" => Ok(Effect::Softer),
            _ => Err(UnknownEffect(s.to_string())),
        }
    }
}

/// Composite intensities for one render of the effect graph.
///
/// Every field has a neutral value at which its stage is an identity link.
/// The graph applies whatever combination it is handed; keeping
/// higher/lower and louder/softer exclusive is the caller's business.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectParams {
    /// Playback-rate ratio. Neutral: 1.0.
    pub pitch_shift: f32,
    /// Echo depth; each repeat is scaled by `0.5 * echo_decay`. Neutral: 0.0.
    pub echo_decay: f32,
    /// Waveshaper drive. Neutral: 0.0.
    pub distort_amount: f32,
    /// Linear output gain. Neutral: 1.0.
    pub volume_scale: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            pitch_shift: 1.0,
            echo_decay: 0.0,
            distort_amount: 0.0,
            volume_scale: 1.0,
        }
    }
}

impl EffectParams {
    /// Switch `effect` on, keeping the other fields.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        match effect {
            Effect::Higher => self.pitch_shift = SEMITONE_RATIO,
            Effect::Lower => self.pitch_shift = 1.0 / SEMITONE_RATIO,
            Effect::Echo => self.echo_decay = TOGGLE_INTENSITY,
            Effect::Robot => self.distort_amount = TOGGLE_INTENSITY,
            Effect::Louder => self.volume_scale = LOUDER_SCALE,
            Effect::Softer => self.volume_scale = SOFTER_SCALE,
        }
        self
    }

    pub fn pitch_active(&self) -> bool {
        self.pitch_shift != 1.0
    }

    pub fn echo_active(&self) -> bool {
        self.echo_decay != 0.0
    }

    pub fn distort_active(&self) -> bool {
        self.distort_amount != 0.0
    }

    pub fn volume_active(&self) -> bool {
        self.volume_scale != 1.0
    }

    /// True when every field is at its neutral value.
    pub fn is_neutral(&self) -> bool {
        !(self.pitch_active() || self.echo_active() || self.distort_active() || self.volume_active())
    }
}
