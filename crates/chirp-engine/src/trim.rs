//! Trim operator: cut a buffer down to a fractional sub-range.

use chirp_ir::{SampleBuffer, TrimRange};

/// Sample indices `[start, end)` selected by `range` in a buffer of `len`.
///
/// Each fraction maps to `floor(fraction * len)`, clamped to `[0, len]`.
/// The result is not reordered: `start >= end` means an empty selection.
pub fn sample_indices(range: &TrimRange, len: usize) -> (usize, usize) {
    let start = range.start.map_or(0, |f| fraction_to_index(f, len));
    let end = range.end.map_or(len, |f| fraction_to_index(f, len));
    (start, end)
}

fn fraction_to_index(fraction: f64, len: usize) -> usize {
    let idx = libm::floor(fraction * len as f64);
    if idx.is_nan() || idx <= 0.0 {
        0
    } else {
        (idx as usize).min(len)
    }
}

/// Copy of the selected sub-range of `buffer`.
///
/// An empty selection yields an empty buffer rather than an error.
pub fn extract(buffer: &SampleBuffer, range: &TrimRange) -> SampleBuffer {
    let (start, end) = sample_indices(range, buffer.len());
    if start >= end {
        return SampleBuffer::empty(buffer.sample_rate());
    }
    buffer.slice(start..end)
}
