pub mod autocorr;
pub mod descriptors;
pub mod pitch;
pub mod spectrum;

pub use autocorr::{dominant_lag, lag_estimator_for, LagEstimator};
pub use spectrum::{sliding_spectra, transform_for, SpectralFrame, SpectralTransform};
