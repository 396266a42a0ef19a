//! Sample windows to magnitude spectra.
//!
//! Every analyzer goes through [`SpectralTransform`], so the O(N²) direct
//! transform and the rustfft-backed one are interchangeable.

use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::Mutex;

use crate::cancel::CancelToken;
use crate::config::TransformKind;
use crate::error::Result;

/// Magnitudes for one windowed slice of a buffer.
///
/// Bin `i` sits at `i * bin_hz`, with `bin_hz = sample_rate / padded_len`.
/// Magnitudes are divided by the window's coefficient sum, so a full-scale
/// sine peaks near 0.5 whatever the window length.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    pub magnitudes: Vec<f32>,
    pub bin_hz: f32,
}

impl SpectralFrame {
    pub fn empty(bin_hz: f32) -> Self {
        Self {
            magnitudes: Vec::new(),
            bin_hz,
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.bin_hz
    }

    pub fn total_magnitude(&self) -> f32 {
        self.magnitudes.iter().sum()
    }

    /// Index of the strongest bin, `None` when every bin is zero.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &m) in self.magnitudes.iter().enumerate() {
            if m > best.map_or(0.0, |(_, b)| b) {
                best = Some((i, m));
            }
        }
        best.map(|(i, _)| i)
    }
}

pub trait SpectralTransform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Complex spectrum of an already windowed, zero-padded frame of
    /// power-of-two length. Only the first half is used by callers.
    fn forward(&self, frame: Vec<Complex<f32>>) -> Vec<Complex<f32>>;

    fn spectrum(&self, window: &[f32], sample_rate: u32) -> SpectralFrame {
        let padded = window.len().next_power_of_two().max(2);
        let bin_hz = sample_rate as f32 / padded as f32;
        if window.is_empty() {
            return SpectralFrame::empty(bin_hz);
        }

        let coeffs = hamming_window(window.len());
        let coeff_sum: f32 = coeffs.iter().sum();

        let mut frame = vec![Complex::new(0.0f32, 0.0); padded];
        for (i, (&s, &w)) in window.iter().zip(coeffs.iter()).enumerate() {
            frame[i] = Complex::new(s * w, 0.0);
        }

        let out = self.forward(frame);
        let scale = if coeff_sum > 0.0 { 1.0 / coeff_sum } else { 0.0 };
        let magnitudes = out[..padded / 2]
            .iter()
            .map(|c| {
                let m = c.norm() * scale;
                if m.is_finite() { m } else { 0.0 }
            })
            .collect();

        SpectralFrame { magnitudes, bin_hz }
    }
}

/// Textbook DFT, O(N²).
#[derive(Debug, Default)]
pub struct DirectTransform;

impl SpectralTransform for DirectTransform {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn forward(&self, frame: Vec<Complex<f32>>) -> Vec<Complex<f32>> {
        let n = frame.len();
        let half = n / 2;
        let mut out = vec![Complex::new(0.0f32, 0.0); n];
        for (k, slot) in out.iter_mut().enumerate().take(half) {
            let mut re = 0.0f64;
            let mut im = 0.0f64;
            for (i, x) in frame.iter().enumerate() {
                if x.re == 0.0 && x.im == 0.0 {
                    continue;
                }
                // Reduce k*i mod n first so the angle stays small.
                let phase = ((k * i) % n) as f64 / n as f64;
                let angle = -2.0 * std::f64::consts::PI * phase;
                let (sin, cos) = angle.sin_cos();
                re += x.re as f64 * cos - x.im as f64 * sin;
                im += x.re as f64 * sin + x.im as f64 * cos;
            }
            *slot = Complex::new(re as f32, im as f32);
        }
        out
    }
}

/// rustfft-backed transform; plans are cached across calls.
pub struct FftTransform {
    planner: Mutex<FftPlanner<f32>>,
}

impl FftTransform {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }
}

impl Default for FftTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTransform for FftTransform {
    fn name(&self) -> &'static str {
        "fft"
    }

    fn forward(&self, mut frame: Vec<Complex<f32>>) -> Vec<Complex<f32>> {
        let fft = {
            let mut planner = match self.planner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            planner.plan_fft_forward(frame.len())
        };
        fft.process(&mut frame);
        frame
    }
}

pub fn transform_for(kind: TransformKind) -> Box<dyn SpectralTransform> {
    match kind {
        TransformKind::Direct => Box::new(DirectTransform),
        TransformKind::Fft => Box::new(FftTransform::new()),
    }
}

/// `0.54 - 0.46 cos(2πi / (N-1))`
pub fn hamming_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()
        })
        .collect()
}

/// Start offsets of full windows; a buffer shorter than one window yields a
/// single window at 0.
pub fn window_starts(len: usize, window: usize, hop: usize) -> Vec<usize> {
    if len <= window {
        return vec![0];
    }
    (0..=len - window).step_by(hop.max(1)).collect()
}

/// Spectra of every window along `samples`, each tagged with its start time
/// in seconds. Time order is preserved even when computed in parallel.
pub fn sliding_spectra(
    transform: &dyn SpectralTransform,
    samples: &[f32],
    sample_rate: u32,
    window: usize,
    hop: usize,
    parallel: bool,
    cancel: &CancelToken,
) -> Result<Vec<(f32, SpectralFrame)>> {
    let starts = window_starts(samples.len(), window, hop);
    let compute = |&start: &usize| -> Result<(f32, SpectralFrame)> {
        cancel.check()?;
        let end = (start + window).min(samples.len());
        let time = start as f32 / sample_rate as f32;
        Ok((time, transform.spectrum(&samples[start..end], sample_rate)))
    };
    if parallel {
        starts.par_iter().map(compute).collect()
    } else {
        starts.iter().map(compute).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn hamming_endpoints() {
        let w = hamming_window(9);
        assert!((w[0] - 0.08).abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert!((w[8] - 0.08).abs() < 1e-6);
    }

    #[test]
    fn pads_to_power_of_two() {
        let frame = FftTransform::new().spectrum(&vec![0.1; 1000], 8000);
        assert_eq!(frame.len(), 512);
        assert!((frame.bin_hz - 8000.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    fn silence_gives_zero_spectrum() {
        for transform in [transform_for(TransformKind::Direct), transform_for(TransformKind::Fft)] {
            let frame = transform.spectrum(&[0.0; 256], 44100);
            assert_eq!(frame.len(), 128);
            assert!(frame.magnitudes.iter().all(|&m| m == 0.0));
            assert_eq!(frame.peak_bin(), None);
        }
    }

    #[test]
    fn direct_and_fft_agree() {
        let samples: Vec<f32> = sine(1000.0, 8000, 300, 0.7)
            .iter()
            .zip(sine(2750.0, 8000, 300, 0.2))
            .map(|(a, b)| a + b)
            .collect();
        let direct = DirectTransform.spectrum(&samples, 8000);
        let fast = FftTransform::new().spectrum(&samples, 8000);
        assert_eq!(direct.len(), fast.len());
        for (a, b) in direct.magnitudes.iter().zip(&fast.magnitudes) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let frame = FftTransform::new().spectrum(&sine(1000.0, 8000, 1024, 1.0), 8000);
        let peak = frame.peak_bin().unwrap();
        assert!((frame.frequency(peak) - 1000.0).abs() <= frame.bin_hz);
        assert!((frame.magnitudes[peak] - 0.5).abs() < 0.05);
    }

    #[test]
    fn sliding_windows_are_time_ordered() {
        let samples = sine(440.0, 8000, 8000, 0.5);
        let frames = sliding_spectra(
            &FftTransform::new(),
            &samples,
            8000,
            1024,
            512,
            true,
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(frames.len(), window_starts(8000, 1024, 512).len());
        assert!(frames.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn short_buffer_is_one_window() {
        assert_eq!(window_starts(100, 1024, 512), vec![0]);
        assert_eq!(window_starts(2048, 1024, 512), vec![0, 512, 1024]);
    }
}
