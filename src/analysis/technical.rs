use serde::Serialize;

use crate::dsp::descriptors::{peak_amplitude, spectral_crest};
use crate::dsp::spectrum::SpectralFrame;

/// Samples quieter than this (about -100 dBFS) are treated as zero.
const NEAR_ZERO: f32 = 1e-5;
/// Gate for the loudness estimate, matching the absolute LUFS gate.
pub const LOUDNESS_FLOOR_LUFS: f32 = -70.0;
/// Reported when a spectrum has harmonic energy but no noise at all.
pub const HNR_CEILING_DB: f32 = 60.0;
const HARMONICS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TechnicalMetrics {
    pub dynamic_range_db: f32,
    pub loudness_lufs: f32,
    pub peak_dbfs: f32,
    pub peak_frequency_hz: f32,
    pub harmonic_to_noise_db: f32,
    pub spectral_crest: f32,
}

/// `20·log10(max|x| / min|x|)` over samples above the near-zero floor; 0 when
/// there are none.
pub fn dynamic_range_db(samples: &[f32]) -> f32 {
    let mut max = 0.0f32;
    let mut min = f32::INFINITY;
    for &s in samples {
        let a = s.abs();
        if a > NEAR_ZERO {
            max = max.max(a);
            min = min.min(a);
        }
    }
    if max <= 0.0 || !min.is_finite() {
        return 0.0;
    }
    20.0 * (max / min).log10()
}

/// Ungated LUFS approximation: `-0.691 + 20·log10(rms)`, floored at -70.
pub fn loudness_lufs(rms: f32) -> f32 {
    if rms <= 0.0 {
        return LOUDNESS_FLOOR_LUFS;
    }
    (-0.691 + 20.0 * rms.log10()).max(LOUDNESS_FLOOR_LUFS)
}

pub fn peak_dbfs(samples: &[f32]) -> f32 {
    let peak = peak_amplitude(samples);
    if peak <= NEAR_ZERO {
        return 20.0 * NEAR_ZERO.log10();
    }
    20.0 * peak.log10()
}

pub fn peak_frequency(frame: &SpectralFrame) -> f32 {
    frame.peak_bin().map_or(0.0, |bin| frame.frequency(bin))
}

/// Energy at the strongest non-DC bin and its first ten multiples (±1 bin)
/// against everything else, in dB.
pub fn harmonic_to_noise_db(frame: &SpectralFrame) -> f32 {
    let fundamental = frame
        .magnitudes
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, &m)| m > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    let Some(f0) = fundamental else {
        return 0.0;
    };

    let mut harmonic = 0.0f64;
    let mut noise = 0.0f64;
    for (i, &m) in frame.magnitudes.iter().enumerate().skip(1) {
        let energy = m as f64 * m as f64;
        let nearest = ((i as f64 / f0 as f64).round() as usize).max(1);
        let is_harmonic = nearest <= HARMONICS && i.abs_diff(nearest * f0) <= 1;
        if is_harmonic {
            harmonic += energy;
        } else {
            noise += energy;
        }
    }

    if noise <= 0.0 {
        return HNR_CEILING_DB;
    }
    ((10.0 * (harmonic / noise).log10()) as f32).clamp(-HNR_CEILING_DB, HNR_CEILING_DB)
}

pub fn technical_metrics(samples: &[f32], rms: f32, spectrum: &SpectralFrame) -> TechnicalMetrics {
    TechnicalMetrics {
        dynamic_range_db: dynamic_range_db(samples),
        loudness_lufs: loudness_lufs(rms),
        peak_dbfs: peak_dbfs(samples),
        peak_frequency_hz: peak_frequency(spectrum),
        harmonic_to_noise_db: harmonic_to_noise_db(spectrum),
        spectral_crest: spectral_crest(spectrum),
    }
}
