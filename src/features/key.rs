use crate::dsp::pitch::pitch_class;
use crate::dsp::spectrum::SpectralFrame;

/// Pitch class reported when a spectrum has no pitched peak.
pub const DEFAULT_KEY: usize = 0;

/// Pitch class of the single strongest non-DC bin.
///
/// The harmony analyzer re-runs this per window to follow the key over time.
pub fn dominant_pitch_class(frame: &SpectralFrame) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &m) in frame.magnitudes.iter().enumerate().skip(1) {
        if m > best.map_or(0.0, |(_, b)| b) {
            best = Some((i, m));
        }
    }
    best.and_then(|(bin, _)| pitch_class(frame.frequency(bin)))
}

pub fn estimate_key(frame: &SpectralFrame) -> usize {
    dominant_pitch_class(frame).unwrap_or(DEFAULT_KEY)
}
