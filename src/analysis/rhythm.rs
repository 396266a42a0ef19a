//! Onset timeline and the interval statistics derived from it.

use serde::Serialize;
use std::fmt;

use crate::cancel::CancelToken;
use crate::dsp::spectrum::SpectralFrame;
use crate::error::Result;

/// Mean inter-onset interval (seconds) above which the meter reads as 3/4.
const SLOW_INTERVAL_SECS: f32 = 0.8;
/// Interval variance bounds (s²) for the groove buckets.
const STRAIGHT_VARIANCE: f32 = 0.0025;
const SWING_VARIANCE: f32 = 0.01;
/// Intervals within this fraction of a cluster's mean join the cluster.
const CLUSTER_TOLERANCE: f32 = 0.1;
const MIN_CLUSTER_SIZE: usize = 3;
/// Cross-rhythm ratios (3:2, 4:3, 5:4) and how close a ratio must be.
const POLY_RATIOS: [f32; 3] = [1.5, 4.0 / 3.0, 1.25];
const RATIO_TOLERANCE: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeSignature {
    #[serde(rename = "4/4")]
    FourFour,
    #[serde(rename = "3/4")]
    ThreeFour,
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSignature::FourFour => f.write_str("4/4"),
            TimeSignature::ThreeFour => f.write_str("3/4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Groove {
    Straight,
    Swing,
    Syncopated,
}

impl fmt::Display for Groove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhythmAnalysis {
    /// Onset times in seconds, non-decreasing
    pub onsets: Vec<f32>,
    pub time_signature: TimeSignature,
    pub polyrhythmic: bool,
    pub groove: Groove,
    /// Coefficient of variation of the inter-onset intervals, 0–1
    pub complexity: f32,
}

/// Positive spectral flux onsets.
///
/// `frames` are consecutive spectra in time order; the first is compared
/// against silence. An onset closer than `min_gap` seconds to the previous
/// one is dropped.
pub fn detect_onsets(
    frames: &[(f32, SpectralFrame)],
    threshold: f32,
    min_gap: f32,
    cancel: &CancelToken,
) -> Result<Vec<f32>> {
    let mut onsets: Vec<f32> = Vec::new();
    let mut prev: Option<&SpectralFrame> = None;

    for (time, frame) in frames {
        cancel.check()?;
        let flux: f32 = match prev {
            Some(p) => frame
                .magnitudes
                .iter()
                .zip(p.magnitudes.iter())
                .map(|(cur, prev)| (cur - prev).max(0.0))
                .sum(),
            None => frame.total_magnitude(),
        };
        prev = Some(frame);

        if flux > threshold {
            let far_enough = onsets.last().map_or(true, |&last| time - last >= min_gap);
            if far_enough {
                onsets.push(*time);
            }
        }
    }

    Ok(onsets)
}

pub fn intervals(onsets: &[f32]) -> Vec<f32> {
    onsets.windows(2).map(|w| w[1] - w[0]).collect()
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn variance(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32
}

pub fn time_signature(intervals: &[f32]) -> TimeSignature {
    if intervals.is_empty() {
        return TimeSignature::FourFour;
    }
    if mean(intervals) > SLOW_INTERVAL_SECS {
        TimeSignature::ThreeFour
    } else {
        TimeSignature::FourFour
    }
}

pub fn groove(intervals: &[f32]) -> Groove {
    let v = variance(intervals);
    if v < STRAIGHT_VARIANCE {
        Groove::Straight
    } else if v < SWING_VARIANCE {
        Groove::Swing
    } else {
        Groove::Syncopated
    }
}

pub fn rhythm_complexity(intervals: &[f32]) -> f32 {
    let m = mean(intervals);
    if m <= 0.0 {
        return 0.0;
    }
    (variance(intervals).sqrt() / m).clamp(0.0, 1.0)
}

/// Groups sorted intervals into clusters of similar length and returns
/// `(mean, count)` for each, largest count first.
fn interval_clusters(intervals: &[f32]) -> Vec<(f32, usize)> {
    let mut sorted: Vec<f32> = intervals.iter().copied().filter(|i| *i > 0.0).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut clusters: Vec<(f32, usize)> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some((cluster_mean, count))
                if (value - *cluster_mean).abs() <= *cluster_mean * CLUSTER_TOLERANCE =>
            {
                *cluster_mean = (*cluster_mean * *count as f32 + value) / (*count + 1) as f32;
                *count += 1;
            }
            _ => clusters.push((value, 1)),
        }
    }
    // Stable: equal counts keep shorter intervals first.
    clusters.sort_by(|a, b| b.1.cmp(&a.1));
    clusters
}

/// Two recurring interval lengths whose ratio is a cross-rhythm (3:2, 4:3
/// or 5:4) rather than a simple subdivision.
pub fn is_polyrhythmic(intervals: &[f32]) -> bool {
    let clusters = interval_clusters(intervals);
    let strong: Vec<f32> = clusters
        .iter()
        .filter(|(_, count)| *count >= MIN_CLUSTER_SIZE)
        .map(|(m, _)| *m)
        .take(2)
        .collect();
    if strong.len() < 2 {
        return false;
    }
    let (short, long) = if strong[0] < strong[1] {
        (strong[0], strong[1])
    } else {
        (strong[1], strong[0])
    };
    let ratio = long / short;
    POLY_RATIOS.iter().any(|r| (ratio - r).abs() <= RATIO_TOLERANCE)
}

pub fn analyze_rhythm(onsets: Vec<f32>) -> RhythmAnalysis {
    let iois = intervals(&onsets);
    RhythmAnalysis {
        time_signature: time_signature(&iois),
        polyrhythmic: is_polyrhythmic(&iois),
        groove: groove(&iois),
        complexity: rhythm_complexity(&iois),
        onsets,
    }
}
