use serde::{Deserialize, Serialize};

use super::emotion::EmotionalProfile;
use super::fingerprint::Fingerprint;
use super::genre::GenreClassification;
use super::harmony::HarmonyAnalysis;
use super::rhythm::RhythmAnalysis;
use super::technical::TechnicalMetrics;
use crate::features::Mood;

/// The five-field record older callers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAnalysis {
    pub tempo: f32,
    pub key: String,
    pub mood: String,
    pub energy: f32,
    pub danceability: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    pub duration_secs: f32,
    pub sample_rate: u32,
    pub samples: usize,
    pub transform: String,
}

/// Complete output of one analysis run.
///
/// The first five fields serialize at the top level with the same names and
/// meaning as [`LegacyAnalysis`], so a legacy reader can deserialize the JSON
/// of a full result directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Beats per minute, always positive and finite
    pub tempo: f32,
    pub key: String,
    pub mood: Mood,
    /// 0–100
    pub energy: f32,
    /// 0–100
    pub danceability: f32,
    /// True when no periodicity was found and `tempo` is the default
    pub tempo_is_default: bool,
    pub genre: GenreClassification,
    pub harmony: HarmonyAnalysis,
    pub rhythm: RhythmAnalysis,
    pub fingerprint: Fingerprint,
    pub emotion: EmotionalProfile,
    pub technical: TechnicalMetrics,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn legacy(&self) -> LegacyAnalysis {
        LegacyAnalysis {
            tempo: self.tempo,
            key: self.key.clone(),
            mood: self.mood.to_string(),
            energy: self.energy,
            danceability: self.danceability,
        }
    }
}

impl From<&AnalysisResult> for LegacyAnalysis {
    fn from(result: &AnalysisResult) -> Self {
        result.legacy()
    }
}
