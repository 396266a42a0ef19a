use crate::config::AnalysisConfig;
use crate::dsp::autocorr::{dominant_lag, LagEstimator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    pub bpm: f32,
    /// Set when no periodicity was found and `bpm` is the configured default.
    pub fallback: bool,
}

/// Half-wave rectified frame-energy difference, sampled at roughly
/// `envelope_rate` frames per second. Returns the envelope and its exact
/// frame rate.
pub fn novelty_envelope(samples: &[f32], sample_rate: u32, envelope_rate: u32) -> (Vec<f32>, f32) {
    let hop = ((sample_rate as f32 / envelope_rate.max(1) as f32).round() as usize).max(1);
    let rate = sample_rate as f32 / hop as f32;

    let mut previous = 0.0f32;
    let envelope = samples
        .chunks_exact(hop)
        .map(|chunk| {
            let energy: f32 = chunk.iter().map(|s| s * s).sum();
            let rise = (energy - previous).max(0.0);
            previous = energy;
            rise
        })
        .collect();

    (envelope, rate)
}

/// Autocorrelates the novelty envelope over lags matching
/// `min_bpm..=max_bpm`; BPM = 60 · rate / lag.
pub fn estimate_tempo(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
    estimator: &dyn LagEstimator,
) -> TempoEstimate {
    let (envelope, rate) = novelty_envelope(samples, sample_rate, config.envelope_rate);

    let min_lag = (rate * 60.0 / config.max_bpm).floor() as usize;
    let max_lag = (rate * 60.0 / config.min_bpm).ceil() as usize;

    match dominant_lag(estimator, &envelope, min_lag, max_lag) {
        Some(lag) => {
            let bpm = 60.0 * rate / lag as f32;
            if bpm.is_finite() && bpm > 0.0 {
                log::debug!("Tempo: lag {} frames at {:.1} fps -> {:.1} BPM", lag, rate, bpm);
                return TempoEstimate { bpm, fallback: false };
            }
            fallback(config)
        }
        None => fallback(config),
    }
}

fn fallback(config: &AnalysisConfig) -> TempoEstimate {
    log::warn!(
        "No periodicity found, using default tempo of {:.0} BPM",
        config.default_bpm
    );
    TempoEstimate {
        bpm: config.default_bpm,
        fallback: true,
    }
}
