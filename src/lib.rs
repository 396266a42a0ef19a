//! # trackscope
//!
//! Tempo, key, mood, genre, harmony, rhythm, emotion and loudness analysis
//! computed straight from decoded samples with plain signal processing.
//!
//! ```no_run
//! use trackscope::{analyze, AnalysisConfig, SampleBuffer};
//!
//! let samples: Vec<f32> = vec![0.0; 44100];
//! let buffer = SampleBuffer::new(samples, 44100)?;
//! let result = analyze(&buffer, &AnalysisConfig::default())?;
//! println!("{:.1} BPM in {} ({})", result.tempo, result.key, result.mood);
//! # Ok::<(), trackscope::AnalysisError>(())
//! ```
//!
//! Pipeline: windowed spectra → low-level features (tempo, key, chroma,
//! descriptors, energy) → harmony / rhythm / genre / emotion / technical
//! metrics → [`AnalysisResult`].

pub mod analysis;
pub mod audio;
pub mod cancel;
pub mod config;
pub mod dsp;
pub mod error;
pub mod features;

pub use analysis::result::{AnalysisResult, LegacyAnalysis};
pub use audio::{BufferCache, SampleBuffer};
pub use cancel::CancelToken;
pub use config::AnalysisConfig;
pub use error::AnalysisError;

/// Analyze `buffer` to completion (or until `config.timeout_secs` elapses).
pub fn analyze(buffer: &SampleBuffer, config: &AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    analysis::run(buffer, config, &CancelToken::new())
}

/// Like [`analyze`], but aborts with [`AnalysisError::Cancelled`] once
/// `cancel` is triggered from another thread.
pub fn analyze_with(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<AnalysisResult, AnalysisError> {
    analysis::run(buffer, config, cancel)
}
