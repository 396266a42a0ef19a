pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// `round(12·log2(f/440) + 69) mod 12`, `None` for non-positive frequencies.
pub fn pitch_class(freq: f32) -> Option<usize> {
    if !(freq.is_finite() && freq > 0.0) {
        return None;
    }
    let midi = (12.0 * (freq / 440.0).log2() + 69.0).round() as i64;
    Some(midi.rem_euclid(12) as usize)
}

pub fn note_name(pitch_class: usize) -> &'static str {
    NOTE_NAMES[pitch_class % 12]
}
