//! Rule-based genre scoring against fixed templates.
//!
//! Templates are scored in table order and sorted with a stable sort, so
//! when two genres tie the one listed first in [`GENRE_TEMPLATES`] wins.

use serde::Serialize;

use crate::dsp::descriptors::BandEnergy;

const TEMPO_WEIGHT: f32 = 0.3;
const ENERGY_WEIGHT: f32 = 0.25;
const FLAG_WEIGHT: f32 = 0.15;

/// Band fractions / complexity at which a track counts as having the trait.
const BASS_HEAVY: f32 = 0.5;
const MELODIC: f32 = 0.4;
const HARMONICALLY_RICH: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreTemplate {
    pub name: &'static str,
    pub bpm_range: (f32, f32),
    /// Expected energy, 0–1
    pub energy_threshold: f32,
    pub bass_emphasis: bool,
    pub melodic_emphasis: bool,
    pub harmonic_complexity: bool,
}

const fn template(
    name: &'static str,
    bpm_range: (f32, f32),
    energy_threshold: f32,
    bass_emphasis: bool,
    melodic_emphasis: bool,
    harmonic_complexity: bool,
) -> GenreTemplate {
    GenreTemplate {
        name,
        bpm_range,
        energy_threshold,
        bass_emphasis,
        melodic_emphasis,
        harmonic_complexity,
    }
}

pub const GENRE_TEMPLATES: &[GenreTemplate] = &[
    template("Electronic", (118.0, 175.0), 0.75, true, false, false),
    template("Hip-Hop", (70.0, 150.0), 0.6, true, false, false),
    template("Rock", (100.0, 170.0), 0.8, false, true, false),
    template("Pop", (90.0, 130.0), 0.65, false, true, false),
    template("R&B", (60.0, 110.0), 0.5, true, true, true),
    template("Jazz", (80.0, 200.0), 0.45, false, true, true),
    template("Classical", (40.0, 140.0), 0.3, false, true, true),
    template("Ambient", (50.0, 100.0), 0.15, false, false, false),
];

/// What the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreInput {
    pub bpm: f32,
    /// 0–100
    pub energy: f32,
    pub bands: BandEnergy,
    /// Normalized spectral entropy of the whole track, 0–1
    pub harmonic_complexity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreScore {
    pub genre: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreClassification {
    pub primary: String,
    pub secondary: Option<String>,
    /// Score of the primary genre, 0–1
    pub confidence: f32,
    pub subgenres: Vec<String>,
    /// Every template's score, best first
    pub scores: Vec<GenreScore>,
}

pub fn score_template(template: &GenreTemplate, input: &GenreInput) -> f32 {
    let mut score = 0.0;

    let (low, high) = template.bpm_range;
    if input.bpm >= low && input.bpm <= high {
        score += TEMPO_WEIGHT;
    }

    let energy = (input.energy / 100.0).clamp(0.0, 1.0);
    let closeness = (1.0 - (energy - template.energy_threshold).abs()).clamp(0.0, 1.0);
    score += ENERGY_WEIGHT * closeness;

    let traits = [
        (template.bass_emphasis, input.bands.bass >= BASS_HEAVY),
        (template.melodic_emphasis, input.bands.mid >= MELODIC),
        (
            template.harmonic_complexity,
            input.harmonic_complexity >= HARMONICALLY_RICH,
        ),
    ];
    for (expected, present) in traits {
        if expected == present {
            score += FLAG_WEIGHT;
        }
    }

    score.clamp(0.0, 1.0)
}

pub fn subgenres(primary: &str, input: &GenreInput) -> Vec<String> {
    let energy = input.energy / 100.0;
    let bpm = input.bpm;
    let mut tags: Vec<&str> = Vec::new();
    match primary {
        "Hip-Hop" => {
            if bpm > 140.0 {
                tags.push("Drill");
            }
            if input.bands.bass >= 0.6 {
                tags.push("Trap");
            }
            if bpm < 90.0 {
                tags.push("Boom Bap");
            }
        }
        "Electronic" => {
            if (118.0..130.0).contains(&bpm) {
                tags.push("House");
            } else if (130.0..150.0).contains(&bpm) {
                tags.push("Techno");
            } else if bpm >= 160.0 {
                tags.push("Drum & Bass");
            }
            if energy < 0.4 {
                tags.push("Downtempo");
            }
        }
        "Rock" => {
            if energy > 0.85 {
                tags.push("Hard Rock");
            }
            if bpm > 150.0 {
                tags.push("Punk");
            }
        }
        "Pop" => {
            if energy > 0.7 {
                tags.push("Dance Pop");
            } else if energy < 0.4 {
                tags.push("Ballad");
            }
        }
        "R&B" => {
            if bpm < 80.0 {
                tags.push("Slow Jam");
            }
        }
        "Jazz" => {
            if input.harmonic_complexity > 0.8 {
                tags.push("Bebop");
            }
            if bpm < 100.0 {
                tags.push("Smooth Jazz");
            }
        }
        "Classical" => {
            tags.push(if energy < 0.2 { "Chamber" } else { "Orchestral" });
        }
        "Ambient" => {
            if energy < 0.1 {
                tags.push("Drone");
            }
        }
        _ => {}
    }
    tags.into_iter().map(String::from).collect()
}

pub fn classify_genre(input: &GenreInput) -> GenreClassification {
    classify_with(GENRE_TEMPLATES, input)
}

pub fn classify_with(templates: &[GenreTemplate], input: &GenreInput) -> GenreClassification {
    let mut scores: Vec<GenreScore> = templates
        .iter()
        .map(|t| GenreScore {
            genre: t.name.to_string(),
            score: score_template(t, input),
        })
        .collect();
    // sort_by is stable: ties keep table order.
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    let primary = scores
        .first()
        .map(|s| s.genre.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let confidence = scores.first().map_or(0.0, |s| s.score);
    let secondary = scores.get(1).map(|s| s.genre.clone());

    log::debug!("Genre: {} ({:.2}), runner-up {:?}", primary, confidence, secondary);

    GenreClassification {
        subgenres: subgenres(&primary, input),
        primary,
        secondary,
        confidence,
        scores,
    }
}
