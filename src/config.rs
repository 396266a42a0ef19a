use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AnalysisError, Result};

/// Strategy used to turn a sample window into a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Direct O(N²) discrete transform.
    Direct,
    /// rustfft-backed fast transform.
    Fft,
}

/// Strategy used to find the dominant periodicity of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LagKind {
    Direct,
    Fft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_transform")]
    pub transform: TransformKind,
    #[serde(default = "default_autocorrelation")]
    pub autocorrelation: LagKind,

    /// Window and hop for harmony analysis and the long-term spectrum
    #[serde(default = "default_analysis_window")]
    pub analysis_window: usize,
    #[serde(default = "default_analysis_hop")]
    pub analysis_hop: usize,

    #[serde(default = "default_onset_window")]
    pub onset_window: usize,
    #[serde(default = "default_onset_hop")]
    pub onset_hop: usize,
    /// Positive spectral flux (normalized magnitudes) needed to emit an onset
    #[serde(default = "default_onset_threshold")]
    pub onset_threshold: f32,
    /// Seconds
    #[serde(default = "default_min_onset_gap")]
    pub min_onset_gap: f32,

    /// Seconds before key changes are recorded
    #[serde(default = "default_key_change_warmup")]
    pub key_change_warmup: f32,

    #[serde(default = "default_min_bpm")]
    pub min_bpm: f32,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f32,
    #[serde(default = "default_bpm")]
    pub default_bpm: f32,
    /// Frames per second of the tempo novelty envelope
    #[serde(default = "default_envelope_rate")]
    pub envelope_rate: u32,

    #[serde(default)]
    pub timeout_secs: Option<f64>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            transform: default_transform(),
            autocorrelation: default_autocorrelation(),
            analysis_window: default_analysis_window(),
            analysis_hop: default_analysis_hop(),
            onset_window: default_onset_window(),
            onset_hop: default_onset_hop(),
            onset_threshold: default_onset_threshold(),
            min_onset_gap: default_min_onset_gap(),
            key_change_warmup: default_key_change_warmup(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            default_bpm: default_bpm(),
            envelope_rate: default_envelope_rate(),
            timeout_secs: None,
            parallel: default_parallel(),
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    /// Reject settings the analyzers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.analysis_window < 2 || self.onset_window < 2 {
            return Err(AnalysisError::Config(
                "analysis and onset windows must hold at least 2 samples".into(),
            ));
        }
        if self.analysis_hop == 0 || self.onset_hop == 0 {
            return Err(AnalysisError::Config("hop sizes must be non-zero".into()));
        }
        if !(self.min_bpm > 0.0 && self.min_bpm < self.max_bpm) {
            return Err(AnalysisError::Config(format!(
                "bpm range {}..{} is empty",
                self.min_bpm, self.max_bpm
            )));
        }
        if !(self.default_bpm.is_finite() && self.default_bpm > 0.0) {
            return Err(AnalysisError::Config("default_bpm must be positive".into()));
        }
        for (name, value) in [
            ("onset_threshold", self.onset_threshold),
            ("min_onset_gap", self.min_onset_gap),
            ("key_change_warmup", self.key_change_warmup),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AnalysisError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if let Some(secs) = self.timeout_secs {
            if secs.is_nan() || secs < 0.0 {
                return Err(AnalysisError::Config(format!(
                    "timeout_secs must not be negative, got {}",
                    secs
                )));
            }
        }
        if self.envelope_rate == 0 {
            return Err(AnalysisError::Config("envelope_rate must be non-zero".into()));
        }
        Ok(())
    }
}

fn default_transform() -> TransformKind { TransformKind::Fft }
fn default_autocorrelation() -> LagKind { LagKind::Direct }
fn default_analysis_window() -> usize { 8192 }
fn default_analysis_hop() -> usize { 4096 }
fn default_onset_window() -> usize { 1024 }
fn default_onset_hop() -> usize { 512 }
fn default_onset_threshold() -> f32 { 0.2 }
fn default_min_onset_gap() -> f32 { 0.1 }
fn default_key_change_warmup() -> f32 { 5.0 }
fn default_min_bpm() -> f32 { 60.0 }
fn default_max_bpm() -> f32 { 200.0 }
fn default_bpm() -> f32 { 120.0 }
fn default_envelope_rate() -> u32 { 100 }
fn default_parallel() -> bool { true }

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))?;
    let config: AnalysisConfig = toml::from_str(&content)
        .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// `trackscope.toml` in the working directory, else the per-user config file.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from("trackscope.toml");
    if local.exists() {
        return Some(local);
    }
    let platform = dirs::config_dir()?.join("trackscope").join("config.toml");
    platform.exists().then_some(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            transform = "direct"
            onset_threshold = 0.5
            timeout_secs = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.transform, TransformKind::Direct);
        assert_eq!(config.onset_threshold, 0.5);
        assert_eq!(config.analysis_window, 8192);
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bpm_range() {
        let config = AnalysisConfig {
            min_bpm: 180.0,
            max_bpm: 90.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn huge_timeout_means_no_deadline() {
        let config = AnalysisConfig {
            timeout_secs: Some(1e20),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), None);

        let unbounded = AnalysisConfig {
            timeout_secs: Some(f64::INFINITY),
            ..AnalysisConfig::default()
        };
        assert_eq!(unbounded.timeout(), None);
    }

    #[test]
    fn rejects_non_finite_or_negative_thresholds() {
        let bad = [
            AnalysisConfig {
                onset_threshold: f32::NAN,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                min_onset_gap: -0.1,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                key_change_warmup: f32::INFINITY,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                timeout_secs: Some(-1.0),
                ..AnalysisConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
        }

        let config: AnalysisConfig = toml::from_str("onset_threshold = nan").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trackscope.toml");
        std::fs::write(&path, "onset_hop = \"lots\"").unwrap();
        assert!(matches!(load_config(&path), Err(AnalysisError::Config(_))));

        std::fs::write(&path, "onset_hop = 256\nparallel = false").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.onset_hop, 256);
        assert!(!config.parallel);
    }
}
