use crate::dsp::pitch::pitch_class;
use crate::dsp::spectrum::SpectralFrame;

pub const CEPSTRAL_COEFFICIENTS: usize = 13;

/// Natural log assigned to empty bins, so silence stays finite.
pub const LOG_FLOOR: f32 = -23.025_85; // ln(1e-10)

/// Octave-folded magnitude per pitch class, summing to 1 (or all zero for
/// a silent spectrum).
pub fn chroma(frame: &SpectralFrame) -> [f32; 12] {
    let mut bins = [0.0f64; 12];
    for (i, &m) in frame.magnitudes.iter().enumerate().skip(1) {
        if let Some(pc) = pitch_class(frame.frequency(i)) {
            bins[pc] += m as f64;
        }
    }
    let total: f64 = bins.iter().sum();
    if total <= 0.0 {
        return [0.0; 12];
    }
    bins.map(|b| (b / total) as f32)
}

/// Log-magnitude of the first 13 spectrum bins.
///
/// A cheap stand-in for MFCCs: no mel filterbank and no DCT, so treat the
/// values as a rough timbre signature only.
pub fn cepstral_approximation(frame: &SpectralFrame) -> Vec<f32> {
    (0..CEPSTRAL_COEFFICIENTS)
        .map(|i| match frame.magnitudes.get(i) {
            Some(&m) if m > 0.0 => m.ln().max(LOG_FLOOR),
            _ => LOG_FLOOR,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(magnitudes: Vec<f32>) -> SpectralFrame {
        SpectralFrame {
            magnitudes,
            bin_hz: 5.0,
        }
    }

    #[test]
    fn chroma_sums_to_one() {
        let magnitudes: Vec<f32> = (0..2048).map(|i| ((i * 31) % 17) as f32 * 0.01).collect();
        let c = chroma(&frame(magnitudes));
        let sum: f32 = c.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum {}", sum);
        assert!(c.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn silent_chroma_is_zero() {
        assert_eq!(chroma(&frame(vec![0.0; 512])), [0.0; 12]);
    }

    #[test]
    fn single_a_bin_is_pure_a() {
        let mut magnitudes = vec![0.0; 200];
        magnitudes[88] = 0.3; // 440 Hz
        let c = chroma(&frame(magnitudes));
        assert_eq!(c[9], 1.0);
    }

    #[test]
    fn cepstral_is_finite_and_thirteen_long() {
        let mut magnitudes = vec![0.0; 8];
        magnitudes[2] = 1.0;
        let coeffs = cepstral_approximation(&frame(magnitudes));
        assert_eq!(coeffs.len(), CEPSTRAL_COEFFICIENTS);
        assert_eq!(coeffs[2], 0.0);
        assert_eq!(coeffs[0], LOG_FLOOR);
        assert_eq!(coeffs[12], LOG_FLOOR);
        assert!(coeffs.iter().all(|c| c.is_finite()));
    }
}
