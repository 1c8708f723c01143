//! Edit commands applied to the sound being edited.

use core::fmt;

use crate::effects::Effect;
use crate::trim::TrimRange;

/// A committed change to the current buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edit {
    /// One effect toggle, baked into the buffer.
    Effect(Effect),
    /// Cut the buffer down to a sub-range.
    Trim(TrimRange),
    Reverse,
    Undo,
    Redo,
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Effect(effect) => write!(f, "effect {}", effect),
            Edit::Trim(range) => write!(
                f,
                "trim {:.3}..{:.3}",
                range.start_or_zero(),
                range.end_or_one()
            ),
            Edit::Reverse => f.write_str("reverse"),
            Edit::Undo => f.write_str("undo"),
            Edit::Redo => f.write_str("redo"),
        }
    }
}
