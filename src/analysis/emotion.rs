//! Valence/arousal/dominance proxies and the emotion rules over them.

use serde::Serialize;

/// Centroid (Hz) treated as fully bright.
const VALENCE_CENTROID_HZ: f32 = 4000.0;
/// Rolloff (Hz) treated as fully dominant.
const DOMINANCE_ROLLOFF_HZ: f32 = 8000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Emotion {
    Joy,
    Anger,
    Sadness,
    Calm,
    Peaceful,
    Powerful,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionScore {
    pub emotion: Emotion,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionalProfile {
    pub valence: f32,
    pub arousal: f32,
    pub dominance: f32,
    /// Every rule that fired, strongest first
    pub emotions: Vec<EmotionScore>,
}

impl EmotionalProfile {
    pub fn dominant(&self) -> Option<Emotion> {
        self.emotions.first().map(|e| e.emotion)
    }
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `centroid_hz` → valence, `energy` (0–100) → arousal, `rolloff_hz` →
/// dominance.
pub fn map_emotions(centroid_hz: f32, energy: f32, rolloff_hz: f32) -> EmotionalProfile {
    let v = unit(centroid_hz / VALENCE_CENTROID_HZ);
    let a = unit(energy / 100.0);
    let d = unit(rolloff_hz / DOMINANCE_ROLLOFF_HZ);

    let rules: [(Emotion, bool, f32); 6] = [
        (Emotion::Joy, v > 0.6 && a > 0.6, (v + a) / 2.0),
        (
            Emotion::Anger,
            v < 0.4 && a > 0.7 && d > 0.5,
            (a + d + (1.0 - v)) / 3.0,
        ),
        (
            Emotion::Sadness,
            v < 0.4 && a < 0.4,
            ((1.0 - v) + (1.0 - a)) / 2.0,
        ),
        (Emotion::Calm, a < 0.3 && d < 0.5, ((1.0 - a) + (1.0 - d)) / 2.0),
        (Emotion::Peaceful, v >= 0.4 && a < 0.4, (v + (1.0 - a)) / 2.0),
        (Emotion::Powerful, d > 0.7 && a > 0.5, (d + a) / 2.0),
    ];

    let mut emotions: Vec<EmotionScore> = rules
        .iter()
        .filter(|(_, fires, _)| *fires)
        .map(|&(emotion, _, intensity)| EmotionScore {
            emotion,
            intensity: unit(intensity),
        })
        .collect();
    emotions.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));

    EmotionalProfile {
        valence: v,
        arousal: a,
        dominance: d,
        emotions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(profile: &EmotionalProfile) -> Vec<Emotion> {
        profile.emotions.iter().map(|e| e.emotion).collect()
    }

    #[test]
    fn bright_loud_wide_is_joyful_and_powerful() {
        let profile = map_emotions(3600.0, 90.0, 6000.0);
        assert_eq!(names(&profile), [Emotion::Joy, Emotion::Powerful]);
        assert!(profile.emotions[0].intensity >= profile.emotions[1].intensity);
    }

    #[test]
    fn dark_loud_is_angry() {
        let profile = map_emotions(800.0, 95.0, 5200.0);
        assert_eq!(profile.dominant(), Some(Emotion::Anger));
    }

    #[test]
    fn silence_is_sad_and_calm() {
        let profile = map_emotions(0.0, 0.0, 0.0);
        assert_eq!(profile.valence, 0.0);
        assert_eq!(names(&profile), [Emotion::Sadness, Emotion::Calm]);
        assert!(profile.emotions.iter().all(|e| e.intensity == 1.0));
    }

    #[test]
    fn soft_bright_is_peaceful() {
        let profile = map_emotions(3000.0, 20.0, 5000.0);
        assert_eq!(profile.dominant(), Some(Emotion::Peaceful));
    }

    #[test]
    fn non_finite_inputs_are_clamped() {
        let profile = map_emotions(f32::INFINITY, f32::NAN, -5.0);
        for value in [profile.valence, profile.arousal, profile.dominance] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
