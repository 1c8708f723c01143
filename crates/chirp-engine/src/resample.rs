//! Linear-interpolating resampler shared by the pitch stage and playback.

/// Sample at fractional position `pos`, blending the two nearest samples.
///
/// Positions past the end fade towards zero; negative positions read zero.
/// At integer positions the stored sample is returned unchanged.
pub fn read_interpolated(samples: &[f32], pos: f64) -> f32 {
    if pos < 0.0 {
        return 0.0;
    }
    let idx = pos as usize;
    let Some(&a) = samples.get(idx) else {
        return 0.0;
    };
    let frac = (pos - idx as f64) as f32;
    if frac == 0.0 {
        return a;
    }
    let b = samples.get(idx + 1).copied().unwrap_or(0.0);
    a + (b - a) * frac
}

/// Fill `output` by stepping through `input` at `rate` source samples per
/// output sample, starting at `start`.
///
/// Returns the source position after the last written sample.
pub fn resample_into(input: &[f32], rate: f64, start: f64, output: &mut [f32]) -> f64 {
    for (i, out) in output.iter_mut().enumerate() {
        *out = read_interpolated(input, start + i as f64 * rate);
    }
    start + output.len() as f64 * rate
}
