//! Waveform summary: per-chunk loudness levels for display.

use alloc::vec::Vec;

/// Samples summarized by one level.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// RMS amplitude that maps to a full-height level.
const LEVEL_SCALING: f32 = 0.55;

/// Display level of `samples`: `sqrt(rms / 0.55)`, capped at 1.
///
/// The square root lifts quiet passages so they stay visible.
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    let rms = libm::sqrtf(sum_squares / samples.len() as f32);
    libm::sqrtf(rms / LEVEL_SCALING).min(1.0)
}

/// One level per `chunk_size` samples, with a zero level at each end.
///
/// A trailing partial chunk gets its own level. `chunk_size` of zero is
/// treated as one.
pub fn chunk_levels(samples: &[f32], chunk_size: usize) -> Vec<f32> {
    let chunk_size = chunk_size.max(1);
    let mut levels = Vec::with_capacity(samples.len() / chunk_size + 3);
    levels.push(0.0);
    levels.extend(samples.chunks(chunk_size).map(rms_level));
    levels.push(0.0);
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn empty_buffer_has_only_padding() {
        assert_eq!(chunk_levels(&[], 1024), vec![0.0, 0.0]);
    }

    #[test]
    fn partial_chunk_gets_a_level() {
        let samples = vec![0.5; 2500];
        let levels = chunk_levels(&samples, 1024);
        // 0, three chunks (1024, 1024, 452), 0
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0], 0.0);
        assert_eq!(levels[4], 0.0);
        assert!((levels[3] - levels[1]).abs() < 1e-6);
    }

    #[test]
    fn loud_signal_saturates_at_one() {
        assert_eq!(rms_level(&[1.0, -1.0, 1.0]), 1.0);
    }

    #[test]
    fn silence_is_zero() {
        assert_eq!(rms_level(&[0.0; 64]), 0.0);
    }

    #[test]
    fn quiet_signal_is_lifted() {
        // rms 0.0055 -> sqrt(0.01) = 0.1
        let level = rms_level(&[0.0055; 16]);
        assert!((level - 0.1).abs() < 1e-4, "got {}", level);
    }
}
