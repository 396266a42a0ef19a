//! Sequence to dominant periodicity.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::LagKind;

pub trait LagEstimator: Send + Sync {
    /// `r[l] = Σ x[j]·x[j+l]` for `l` in `0..=max_lag`.
    fn autocorrelation(&self, signal: &[f32], max_lag: usize) -> Vec<f64>;
}

/// Sums every product directly, O(N·L).
#[derive(Debug, Default)]
pub struct DirectAutocorrelation;

impl LagEstimator for DirectAutocorrelation {
    fn autocorrelation(&self, signal: &[f32], max_lag: usize) -> Vec<f64> {
        let n = signal.len();
        (0..=max_lag)
            .map(|lag| {
                if lag >= n {
                    return 0.0;
                }
                signal[..n - lag]
                    .iter()
                    .zip(&signal[lag..])
                    .map(|(&a, &b)| a as f64 * b as f64)
                    .sum()
            })
            .collect()
    }
}

/// Wiener-Khinchin: inverse transform of the power spectrum.
#[derive(Debug, Default)]
pub struct FftAutocorrelation;

impl LagEstimator for FftAutocorrelation {
    fn autocorrelation(&self, signal: &[f32], max_lag: usize) -> Vec<f64> {
        let n = signal.len();
        if n == 0 {
            return vec![0.0; max_lag + 1];
        }
        // Pad to at least 2N so the circular correlation does not wrap.
        let size = (2 * n).next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .map(|&s| Complex::new(s as f64, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(size)
            .collect();
        forward.process(&mut buffer);
        for c in buffer.iter_mut() {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        inverse.process(&mut buffer);

        (0..=max_lag)
            .map(|lag| if lag < n { buffer[lag].re / size as f64 } else { 0.0 })
            .collect()
    }
}

pub fn lag_estimator_for(kind: LagKind) -> Box<dyn LagEstimator> {
    match kind {
        LagKind::Direct => Box::new(DirectAutocorrelation),
        LagKind::Fft => Box::new(FftAutocorrelation),
    }
}

/// Lag in `min_lag..=max_lag` with the largest positive autocorrelation.
///
/// `max_lag` is capped at half the signal length. Returns `None` when no lag
/// correlates positively (silence, or a range the signal cannot cover);
/// callers substitute their own default. Ties go to the shorter lag.
pub fn dominant_lag(
    estimator: &dyn LagEstimator,
    signal: &[f32],
    min_lag: usize,
    max_lag: usize,
) -> Option<usize> {
    let max_lag = max_lag.min(signal.len() / 2);
    let min_lag = min_lag.max(1);
    if min_lag > max_lag {
        return None;
    }
    let r = estimator.autocorrelation(signal, max_lag);
    let mut best: Option<(usize, f64)> = None;
    for (lag, &value) in r.iter().enumerate().take(max_lag + 1).skip(min_lag) {
        if value > best.map_or(0.0, |(_, b)| b) {
            best = Some((lag, value));
        }
    }
    best.map(|(lag, _)| lag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulses(len: usize, every: usize) -> Vec<f32> {
        (0..len).map(|i| if i % every == 0 { 1.0 } else { 0.0 }).collect()
    }

    #[test]
    fn direct_and_fft_agree() {
        let signal: Vec<f32> = (0..200).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.4).collect();
        let a = DirectAutocorrelation.autocorrelation(&signal, 60);
        let b = FftAutocorrelation.autocorrelation(&signal, 60);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6, "{} vs {}", x, y);
        }
    }

    #[test]
    fn finds_pulse_spacing() {
        let signal = pulses(1000, 50);
        for estimator in [lag_estimator_for(LagKind::Direct), lag_estimator_for(LagKind::Fft)] {
            assert_eq!(dominant_lag(estimator.as_ref(), &signal, 30, 100), Some(50));
        }
    }

    #[test]
    fn silence_has_no_lag() {
        assert_eq!(dominant_lag(&DirectAutocorrelation, &[0.0; 500], 1, 200), None);
    }

    #[test]
    fn range_beyond_half_length_is_empty() {
        assert_eq!(dominant_lag(&DirectAutocorrelation, &pulses(40, 5), 30, 100), None);
    }
}
