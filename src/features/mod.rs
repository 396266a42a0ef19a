//! Stateless low-level extractors.

pub mod chroma;
pub mod key;
pub mod mood;
pub mod tempo;

use crate::audio::SampleBuffer;
use crate::config::AnalysisConfig;
use crate::dsp::autocorr::LagEstimator;
use crate::dsp::descriptors::{
    band_energy, rms, spectral_centroid, spectral_crest, spectral_rolloff, zero_crossing_rate,
    BandEnergy,
};
use crate::dsp::spectrum::SpectralFrame;

pub use mood::Mood;
pub use tempo::TempoEstimate;

/// Everything the mid- and high-level stages read besides raw samples.
#[derive(Debug, Clone)]
pub struct LowLevelFeatures {
    pub tempo: TempoEstimate,
    pub key: usize,
    pub chroma: [f32; 12],
    pub cepstral: Vec<f32>,
    pub rms: f32,
    pub energy: f32,
    pub danceability: f32,
    pub mood: Mood,
    pub centroid: f32,
    pub rolloff: f32,
    pub zero_crossing_rate: f32,
    pub crest: f32,
    pub bands: BandEnergy,
    /// Long-term average spectrum the spectral features were taken from
    pub spectrum: SpectralFrame,
}

pub fn extract(
    buffer: &SampleBuffer,
    spectrum: SpectralFrame,
    config: &AnalysisConfig,
    estimator: &dyn LagEstimator,
) -> LowLevelFeatures {
    let samples = buffer.samples();
    let tempo = tempo::estimate_tempo(samples, buffer.sample_rate(), config, estimator);
    let energy = mood::energy(samples);
    let measured_bpm = (!tempo.fallback).then_some(tempo.bpm);
    let danceability = mood::danceability(measured_bpm, energy);

    LowLevelFeatures {
        tempo,
        key: key::estimate_key(&spectrum),
        chroma: chroma::chroma(&spectrum),
        cepstral: chroma::cepstral_approximation(&spectrum),
        rms: rms(samples),
        energy,
        danceability,
        mood: mood::classify_mood(energy, danceability),
        centroid: spectral_centroid(&spectrum),
        rolloff: spectral_rolloff(&spectrum),
        zero_crossing_rate: zero_crossing_rate(samples),
        crest: spectral_crest(&spectrum),
        bands: band_energy(&spectrum),
        spectrum,
    }
}
