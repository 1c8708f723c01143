//! Immutable mono sample buffer.

use alloc::vec::Vec;
use core::ops::Range;

/// Mono `f32` samples plus the rate they were recorded at.
///
/// A buffer is never mutated once built; every edit produces a new one.
/// Callers share buffers through `Arc`, and the history compares them by
/// allocation rather than by content.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap `samples` recorded at `sample_rate` Hz.
    ///
    /// A zero rate is accepted here; rendering rejects it.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A buffer of `len` zero samples.
    pub fn silent(len: usize, sample_rate: u32) -> Self {
        Self::new(alloc::vec![0.0; len], sample_rate)
    }

    /// An empty buffer that keeps `sample_rate`.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).copied()
    }

    /// Length in seconds, or zero when the rate is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy of `range` as a new buffer at the same rate.
    ///
    /// The range is clamped to the buffer; an inverted range yields an
    /// empty buffer.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        Self::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// New buffer with the sample order reversed.
    pub fn reversed(&self) -> Self {
        let samples = self.samples.iter().rev().copied().collect();
        Self::new(samples, self.sample_rate)
    }

    /// Consume the buffer, returning the raw samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
