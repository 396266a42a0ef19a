use crate::error::{AnalysisError, Result};

/// Mono samples plus their sample rate, as handed over by the decoder.
///
/// The buffer is read-only once constructed; analyzers borrow slices of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("sample rate is zero".into()));
        }
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput("sample buffer is empty".into()));
        }
        // Non-finite samples would poison every downstream sum.
        let samples = samples
            .into_iter()
            .map(|s| if s.is_finite() { s } else { 0.0 })
            .collect();
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_zero_rate() {
        assert!(matches!(
            SampleBuffer::new(Vec::new(), 44100),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            SampleBuffer::new(vec![0.0; 8], 0),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn scrubs_non_finite_samples() {
        let buffer = SampleBuffer::new(vec![0.5, f32::NAN, f32::INFINITY, -0.5], 8000).unwrap();
        assert_eq!(buffer.samples(), &[0.5, 0.0, 0.0, -0.5]);
        assert_eq!(buffer.duration(), 4.0 / 8000.0);
        assert!(!buffer.is_silent());
    }
}
