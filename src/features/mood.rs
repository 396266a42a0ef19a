use serde::Serialize;
use std::fmt;

use crate::dsp::descriptors::rms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mood {
    Energetic,
    Intense,
    Upbeat,
    Calm,
    Balanced,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Energetic => "Energetic",
            Mood::Intense => "Intense",
            Mood::Upbeat => "Upbeat",
            Mood::Calm => "Calm",
            Mood::Balanced => "Balanced",
        };
        f.write_str(label)
    }
}

/// `min(2·RMS, 1)` on a 0–100 scale.
pub fn energy(samples: &[f32]) -> f32 {
    ((2.0 * rms(samples)).min(1.0) * 100.0).clamp(0.0, 100.0)
}

/// Heuristic 0–100 score blending tempo fit (1 at 120 BPM, falling linearly
/// to 0 at 60 BPM away) with energy. A fallback tempo earns no tempo
/// credit, so silence scores 0.
pub fn danceability(bpm: Option<f32>, energy: f32) -> f32 {
    let tempo_fit = bpm
        .map(|b| (1.0 - (b - 120.0).abs() / 60.0).clamp(0.0, 1.0))
        .unwrap_or(0.0);
    let score = 0.6 * tempo_fit * 100.0 + 0.4 * energy.clamp(0.0, 100.0);
    score.clamp(0.0, 100.0)
}

/// First matching rule wins, in declaration order.
pub fn classify_mood(energy: f32, danceability: f32) -> Mood {
    if energy > 70.0 && danceability > 70.0 {
        Mood::Energetic
    } else if energy > 70.0 {
        Mood::Intense
    } else if danceability > 60.0 && energy > 40.0 {
        Mood::Upbeat
    } else if energy < 30.0 {
        Mood::Calm
    } else {
        Mood::Balanced
    }
}
