//! Chord sequence, key changes and harmonic complexity over sliding windows.
//!
//! Chord detection is a simplification: each window's chord is the major
//! triad on its dominant pitch class. It tracks the strongest note, it does
//! not recognise real chord qualities.

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::dsp::descriptors::normalized_entropy;
use crate::dsp::pitch::note_name;
use crate::dsp::spectrum::SpectralFrame;
use crate::error::Result;
use crate::features::key::dominant_pitch_class;

/// Major-quality triads that belong to a major key, as semitones above the
/// tonic (I, IV, V).
const DIATONIC_MAJOR_ROOTS: [usize; 3] = [0, 5, 7];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordEvent {
    pub time: f32,
    pub root: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyChangeEvent {
    pub time: f32,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HarmonyAnalysis {
    pub chords: Vec<ChordEvent>,
    pub key_changes: Vec<KeyChangeEvent>,
    /// Highest normalized spectral entropy seen in any window, 0–1
    pub complexity: f32,
    pub modal_interchange: bool,
}

pub fn chord_label(root: usize) -> String {
    note_name(root).to_string()
}

pub fn is_diatonic(chord_root: usize, key: usize) -> bool {
    let offset = (chord_root + 12 - key % 12) % 12;
    DIATONIC_MAJOR_ROOTS.contains(&offset)
}

/// `windows` must be in time order. `initial_key` is the whole-track key the
/// first windows are compared against; changes inside the first
/// `warmup_secs` are ignored.
pub fn analyze_harmony(
    windows: &[(f32, SpectralFrame)],
    initial_key: usize,
    warmup_secs: f32,
    cancel: &CancelToken,
) -> Result<HarmonyAnalysis> {
    let mut result = HarmonyAnalysis::default();
    let mut current_key = initial_key % 12;

    for (time, frame) in windows {
        cancel.check()?;

        result.complexity = result.complexity.max(normalized_entropy(frame));

        let Some(root) = dominant_pitch_class(frame) else {
            continue;
        };

        // Judged against the key in force when the chord appears.
        if !is_diatonic(root, current_key) {
            result.modal_interchange = true;
        }

        if root != current_key && *time > warmup_secs {
            log::debug!(
                "Key change at {:.2}s: {} -> {}",
                time,
                note_name(current_key),
                note_name(root)
            );
            result.key_changes.push(KeyChangeEvent {
                time: *time,
                from: note_name(current_key).to_string(),
                to: note_name(root).to_string(),
            });
            current_key = root;
        }

        if result.chords.last().map(|c| c.root) != Some(root) {
            result.chords.push(ChordEvent {
                time: *time,
                root,
                label: chord_label(root),
            });
        }
    }

    result.complexity = result.complexity.clamp(0.0, 1.0);
    Ok(result)
}
