//! Mid- and high-level analyzers and the pipeline that drives them.

pub mod emotion;
pub mod fingerprint;
pub mod genre;
pub mod harmony;
pub mod result;
pub mod rhythm;
pub mod technical;

use std::time::Instant;

use crate::audio::SampleBuffer;
use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::dsp::autocorr::lag_estimator_for;
use crate::dsp::descriptors::{average_spectrum, normalized_entropy};
use crate::dsp::pitch::note_name;
use crate::dsp::spectrum::{sliding_spectra, transform_for, SpectralFrame, SpectralTransform};
use crate::error::Result;
use crate::features::{self, LowLevelFeatures};

use emotion::EmotionalProfile;
use fingerprint::Fingerprint;
use genre::{GenreClassification, GenreInput};
use harmony::HarmonyAnalysis;
use result::{AnalysisMetadata, AnalysisResult};
use rhythm::RhythmAnalysis;
use technical::TechnicalMetrics;

/// Run every stage over `buffer`.
///
/// Windowed spectra come first, then the low-level features, then harmony,
/// rhythm, genre, emotion and technical metrics. The last five only read
/// shared data, so with `config.parallel` they run on the rayon pool; the
/// result is identical either way.
pub fn run(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<AnalysisResult> {
    config.validate()?;
    let cancel = cancel.with_deadline(config.timeout());
    cancel.check()?;

    let started = Instant::now();
    if buffer.is_silent() {
        log::warn!("Input is silent, features will use their defaults");
    }
    let samples = buffer.samples();
    let sr = buffer.sample_rate();
    let transform = transform_for(config.transform);
    let estimator = lag_estimator_for(config.autocorrelation);

    log::info!(
        "Pass 1: windowed spectra ({} transform, window {}, hop {})...",
        transform.name(),
        config.analysis_window,
        config.analysis_hop
    );
    let windows = sliding_spectra(
        transform.as_ref(),
        samples,
        sr,
        config.analysis_window,
        config.analysis_hop,
        config.parallel,
        &cancel,
    )?;
    let spectrum = average_spectrum(windows.iter().map(|(_, frame)| frame))
        .unwrap_or_else(|| SpectralFrame::empty(sr as f32 / config.analysis_window as f32));

    log::info!("Pass 2: low-level features...");
    let low = features::extract(buffer, spectrum, config, estimator.as_ref());
    cancel.check()?;
    log::info!(
        "Features: tempo={:.1} BPM{}, key={}, energy={:.1}, danceability={:.1}",
        low.tempo.bpm,
        if low.tempo.fallback { " (default)" } else { "" },
        note_name(low.key),
        low.energy,
        low.danceability
    );

    log::info!("Pass 3: harmony, rhythm, genre, emotion, technical...");
    let stages = Stages {
        buffer,
        config,
        cancel: &cancel,
        transform: transform.as_ref(),
        windows: &windows,
        low: &low,
    };
    let ((harmony, rhythm), (genre, emotion, technical)) = if config.parallel {
        rayon::join(
            || rayon::join(|| stages.harmony(), || stages.rhythm()),
            || (stages.genre(), stages.emotion(), stages.technical()),
        )
    } else {
        (
            (stages.harmony(), stages.rhythm()),
            (stages.genre(), stages.emotion(), stages.technical()),
        )
    };
    let harmony = harmony?;
    let rhythm = rhythm?;
    cancel.check()?;

    log::info!(
        "Analysis done in {:.0} ms: {} chords, {} key changes, {} onsets, genre {}",
        started.elapsed().as_secs_f64() * 1000.0,
        harmony.chords.len(),
        harmony.key_changes.len(),
        rhythm.onsets.len(),
        genre.primary
    );

    Ok(AnalysisResult {
        tempo: low.tempo.bpm,
        key: note_name(low.key).to_string(),
        mood: low.mood,
        energy: low.energy,
        danceability: low.danceability,
        tempo_is_default: low.tempo.fallback,
        fingerprint: Fingerprint::from_features(&low),
        genre,
        harmony,
        rhythm,
        emotion,
        technical,
        metadata: AnalysisMetadata {
            duration_secs: buffer.duration(),
            sample_rate: sr,
            samples: buffer.len(),
            transform: transform.name().to_string(),
        },
    })
}

/// Borrowed inputs shared by the independent stages.
struct Stages<'a> {
    buffer: &'a SampleBuffer,
    config: &'a AnalysisConfig,
    cancel: &'a CancelToken,
    transform: &'a dyn SpectralTransform,
    windows: &'a [(f32, SpectralFrame)],
    low: &'a LowLevelFeatures,
}

impl Stages<'_> {
    fn harmony(&self) -> Result<HarmonyAnalysis> {
        harmony::analyze_harmony(
            self.windows,
            self.low.key,
            self.config.key_change_warmup,
            self.cancel,
        )
    }

    fn rhythm(&self) -> Result<RhythmAnalysis> {
        let frames = sliding_spectra(
            self.transform,
            self.buffer.samples(),
            self.buffer.sample_rate(),
            self.config.onset_window,
            self.config.onset_hop,
            self.config.parallel,
            self.cancel,
        )?;
        let onsets = rhythm::detect_onsets(
            &frames,
            self.config.onset_threshold,
            self.config.min_onset_gap,
            self.cancel,
        )?;
        Ok(rhythm::analyze_rhythm(onsets))
    }

    fn genre(&self) -> GenreClassification {
        genre::classify_genre(&GenreInput {
            bpm: self.low.tempo.bpm,
            energy: self.low.energy,
            bands: self.low.bands,
            harmonic_complexity: normalized_entropy(&self.low.spectrum),
        })
    }

    fn emotion(&self) -> EmotionalProfile {
        emotion::map_emotions(self.low.centroid, self.low.energy, self.low.rolloff)
    }

    fn technical(&self) -> TechnicalMetrics {
        technical::technical_metrics(self.buffer.samples(), self.low.rms, &self.low.spectrum)
    }
}
