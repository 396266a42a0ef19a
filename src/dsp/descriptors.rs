//! Scalar descriptors shared by every analyzer.
//!
//! Each returns 0 for a zero-energy input instead of dividing by zero.

use serde::Serialize;

use super::spectrum::SpectralFrame;

pub const ROLLOFF_FRACTION: f32 = 0.85;
pub const BASS_CUTOFF_HZ: f32 = 250.0;
pub const HIGH_CUTOFF_HZ: f32 = 4000.0;

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Magnitude-weighted mean frequency in Hz.
pub fn spectral_centroid(frame: &SpectralFrame) -> f32 {
    let total = frame.total_magnitude();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f32 = frame
        .magnitudes
        .iter()
        .enumerate()
        .map(|(i, &m)| frame.frequency(i) * m)
        .sum();
    weighted / total
}

/// Frequency below which 85% of the spectral energy lies.
pub fn spectral_rolloff(frame: &SpectralFrame) -> f32 {
    let total: f32 = frame.magnitudes.iter().map(|m| m * m).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let target = total * ROLLOFF_FRACTION;
    let mut cumulative = 0.0;
    for (i, &m) in frame.magnitudes.iter().enumerate() {
        cumulative += m * m;
        if cumulative >= target {
            return frame.frequency(i);
        }
    }
    frame.frequency(frame.len().saturating_sub(1))
}

/// Fraction of adjacent sample pairs that change sign.
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / (samples.len() - 1) as f32
}

/// Max over mean magnitude; high for tonal content, near 1 for noise.
pub fn spectral_crest(frame: &SpectralFrame) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let mean = frame.total_magnitude() / frame.len() as f32;
    if mean <= 0.0 {
        return 0.0;
    }
    let max = frame.magnitudes.iter().copied().fold(0.0f32, f32::max);
    max / mean
}

/// Shannon entropy of the bin distribution, divided by its maximum so the
/// result lies in [0, 1].
pub fn normalized_entropy(frame: &SpectralFrame) -> f32 {
    let total = frame.total_magnitude();
    if total <= 0.0 || frame.len() < 2 {
        return 0.0;
    }
    let entropy: f32 = frame
        .magnitudes
        .iter()
        .filter(|&&m| m > 0.0)
        .map(|&m| {
            let p = m / total;
            -p * p.log2()
        })
        .sum();
    (entropy / (frame.len() as f32).log2()).clamp(0.0, 1.0)
}

/// Energy fractions below 250 Hz, 250–4000 Hz and above 4000 Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandEnergy {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

pub fn band_energy(frame: &SpectralFrame) -> BandEnergy {
    let mut bands = [0.0f32; 3];
    for (i, &m) in frame.magnitudes.iter().enumerate() {
        let f = frame.frequency(i);
        let slot = if f < BASS_CUTOFF_HZ {
            0
        } else if f < HIGH_CUTOFF_HZ {
            1
        } else {
            2
        };
        bands[slot] += m * m;
    }
    let total: f32 = bands.iter().sum();
    if total <= 0.0 {
        return BandEnergy::default();
    }
    BandEnergy {
        bass: bands[0] / total,
        mid: bands[1] / total,
        high: bands[2] / total,
    }
}

/// Bin-wise mean of equally sized frames.
pub fn average_spectrum<'a>(frames: impl IntoIterator<Item = &'a SpectralFrame>) -> Option<SpectralFrame> {
    let mut iter = frames.into_iter();
    let first = iter.next()?;
    let mut sum = first.magnitudes.clone();
    let mut count = 1usize;
    for frame in iter {
        if frame.len() != sum.len() {
            continue;
        }
        for (acc, &m) in sum.iter_mut().zip(&frame.magnitudes) {
            *acc += m;
        }
        count += 1;
    }
    for acc in sum.iter_mut() {
        *acc /= count as f32;
    }
    Some(SpectralFrame {
        magnitudes: sum,
        bin_hz: first.bin_hz,
    })
}
