//! Trim selection expressed as fractions of the buffer length.

/// A sub-range of a buffer as fractions of its sample count.
///
/// `start` lies in `[0, 1)` and `end` in `(0, 1]`; a missing side means the
/// corresponding edge of the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrimRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TrimRange {
    /// The whole buffer.
    pub const FULL: TrimRange = TrimRange {
        start: None,
        end: None,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Start fraction, defaulting to the beginning.
    pub fn start_or_zero(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// End fraction, defaulting to the end.
    pub fn end_or_one(&self) -> f64 {
        self.end.unwrap_or(1.0)
    }
}
