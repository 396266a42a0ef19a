use std::f32::consts::PI;

use trackscope::analysis::rhythm::Groove;
use trackscope::audio::decode_file;
use trackscope::config::TransformKind;
use trackscope::{analyze, analyze_with, AnalysisConfig, AnalysisError, CancelToken, LegacyAnalysis, SampleBuffer};

const SR: u32 = 44100;

/// 440 Hz tone under a short decaying click every half second.
fn click_track(seconds: f32) -> SampleBuffer {
    let len = (seconds * SR as f32) as usize;
    let beat = SR as usize / 2;
    let samples = (0..len)
        .map(|i| {
            let tone = 0.3 * (2.0 * PI * 440.0 * i as f32 / SR as f32).sin();
            let offset = i % beat;
            let click = if offset < 8 { 0.8f32.powi(offset as i32) } else { 0.0 };
            tone + click
        })
        .collect();
    SampleBuffer::new(samples, SR).unwrap()
}

fn sine(freq: f32, seconds: f32, sample_rate: u32) -> SampleBuffer {
    let len = (seconds * sample_rate as f32) as usize;
    let samples = (0..len)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect();
    SampleBuffer::new(samples, sample_rate).unwrap()
}

#[test]
fn click_track_end_to_end() {
    let result = analyze(&click_track(10.0), &AnalysisConfig::default()).unwrap();

    assert!((result.tempo - 120.0).abs() <= 5.0, "tempo {}", result.tempo);
    assert!(!result.tempo_is_default);
    assert_eq!(result.key, "A");
    assert!(result.energy > 0.0);

    let onsets = &result.rhythm.onsets;
    assert!(
        (15..=25).contains(&onsets.len()),
        "expected about 20 onsets, got {}",
        onsets.len()
    );
    assert!(onsets.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(result.rhythm.groove, Groove::Straight);

    assert_eq!(result.harmony.chords.len(), 1);
    assert_eq!(result.harmony.chords[0].label, "A");
    assert!(result.harmony.key_changes.is_empty());
    assert!(!result.harmony.modal_interchange);

    let chroma_sum: f32 = result.fingerprint.chroma.iter().sum();
    assert!((chroma_sum - 1.0).abs() < 1e-6, "sum {}", chroma_sum);
    assert!((0.0..=1.0).contains(&result.genre.confidence));
    assert!((0.0..=1.0).contains(&result.harmony.complexity));
    assert!((0.0..=1.0).contains(&result.rhythm.complexity));
    assert!((result.technical.peak_frequency_hz - 440.0).abs() < 10.0);
}

#[test]
fn silence_yields_defaults_without_nan() {
    let buffer = SampleBuffer::new(vec![0.0; SR as usize * 3], SR).unwrap();
    let result = analyze(&buffer, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.energy, 0.0);
    assert!((0.0..=100.0).contains(&result.danceability));
    assert!(result.tempo_is_default);
    assert_eq!(result.tempo, 120.0);
    assert_eq!(result.fingerprint.chroma, [0.0; 12]);
    assert_eq!(result.technical.dynamic_range_db, 0.0);
    assert_eq!(result.fingerprint.spectral_centroid, 0.0);
    assert!(result.rhythm.onsets.is_empty());
    assert!(result.harmony.chords.is_empty());

    // serde_json writes NaN and infinities as null; the only Option field is set.
    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains("null"), "{}", json);
}

#[test]
fn repeated_runs_are_identical() {
    let buffer = click_track(4.0);
    let config = AnalysisConfig::default();
    let first = analyze(&buffer, &config).unwrap();
    let second = analyze(&buffer, &config).unwrap();
    assert_eq!(first, second);

    let sequential = AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    };
    assert_eq!(first, analyze(&buffer, &sequential).unwrap());
}

#[test]
fn legacy_callers_can_read_full_json() {
    let result = analyze(&click_track(3.0), &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let legacy: LegacyAnalysis = serde_json::from_value(json).unwrap();
    assert_eq!(legacy, result.legacy());
    assert_eq!(legacy.mood, result.mood.to_string());
}

#[test]
fn direct_transform_matches_fft() {
    let buffer = sine(1000.0, 0.5, 8000);
    let base = AnalysisConfig {
        analysis_window: 256,
        analysis_hop: 128,
        onset_window: 128,
        onset_hop: 64,
        ..AnalysisConfig::default()
    };
    let direct = AnalysisConfig {
        transform: TransformKind::Direct,
        ..base.clone()
    };
    let fast = analyze(&buffer, &base).unwrap();
    let slow = analyze(&buffer, &direct).unwrap();

    assert_eq!(fast.key, "B");
    assert_eq!(fast.key, slow.key);
    assert_eq!(fast.tempo, slow.tempo);
    assert_eq!(fast.rhythm.onsets, slow.rhythm.onsets);
    assert_eq!(slow.metadata.transform, "direct");
    assert!((fast.fingerprint.spectral_centroid - slow.fingerprint.spectral_centroid).abs() < 1.0);
}

#[test]
fn cancelled_token_aborts() {
    let token = CancelToken::new();
    token.cancel();
    let err = analyze_with(&click_track(2.0), &AnalysisConfig::default(), &token).unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled));
}

#[test]
fn timeout_aborts_long_input() {
    let buffer = SampleBuffer::new(vec![0.1; SR as usize * 60], SR).unwrap();
    let config = AnalysisConfig {
        timeout_secs: Some(1e-9),
        ..AnalysisConfig::default()
    };
    let err = analyze(&buffer, &config).unwrap_err();
    assert!(matches!(err, AnalysisError::Timeout { .. }), "{:?}", err);
}

#[test]
fn decoded_wav_is_analyzed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for s in sine(392.0, 2.0, SR).samples() {
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let buffer = decode_file(&path).unwrap();
    assert_eq!(buffer.sample_rate(), SR);
    let result = analyze(&buffer, &AnalysisConfig::default()).unwrap();
    assert_eq!(result.key, "G");
}
