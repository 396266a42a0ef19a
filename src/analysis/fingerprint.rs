use serde::Serialize;

use crate::features::LowLevelFeatures;

/// Compact timbral/tonal summary of a track.
///
/// `digest` hashes a coarsely quantized copy of the vector, so tracks with
/// identical features share a digest and tiny float noise does not matter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fingerprint {
    pub chroma: [f32; 12],
    /// Log-magnitude approximation of cepstral coefficients (not true MFCCs)
    pub cepstral: Vec<f32>,
    pub spectral_centroid: f32,
    pub spectral_rolloff: f32,
    pub zero_crossing_rate: f32,
    pub spectral_crest: f32,
    pub digest: String,
}

impl Fingerprint {
    pub fn from_features(features: &LowLevelFeatures) -> Self {
        let mut fingerprint = Fingerprint {
            chroma: features.chroma,
            cepstral: features.cepstral.clone(),
            spectral_centroid: features.centroid,
            spectral_rolloff: features.rolloff,
            zero_crossing_rate: features.zero_crossing_rate,
            spectral_crest: features.crest,
            digest: String::new(),
        };
        fingerprint.digest = digest(&fingerprint);
        fingerprint
    }
}

fn quantize(value: f32, scale: f32) -> i32 {
    (value * scale).round() as i32
}

fn digest(fingerprint: &Fingerprint) -> String {
    let mut hasher = blake3::Hasher::new();
    for &c in &fingerprint.chroma {
        hasher.update(&quantize(c, 100.0).to_le_bytes());
    }
    for &c in &fingerprint.cepstral {
        hasher.update(&quantize(c, 10.0).to_le_bytes());
    }
    hasher.update(&quantize(fingerprint.spectral_centroid, 0.1).to_le_bytes());
    hasher.update(&quantize(fingerprint.spectral_rolloff, 0.1).to_le_bytes());
    hasher.update(&quantize(fingerprint.zero_crossing_rate, 1000.0).to_le_bytes());
    hasher.update(&quantize(fingerprint.spectral_crest, 10.0).to_le_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(chroma: [f32; 12], centroid: f32) -> Fingerprint {
        let mut fp = Fingerprint {
            chroma,
            cepstral: vec![-1.0; 13],
            spectral_centroid: centroid,
            spectral_rolloff: 2000.0,
            zero_crossing_rate: 0.05,
            spectral_crest: 12.0,
            digest: String::new(),
        };
        fp.digest = digest(&fp);
        fp
    }

    fn a_only() -> [f32; 12] {
        let mut c = [0.0; 12];
        c[9] = 1.0;
        c
    }

    #[test]
    fn digest_ignores_float_noise() {
        let a = fingerprint(a_only(), 440.0);
        let b = fingerprint(a_only(), 440.001);
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.digest.len(), 16);
    }

    #[test]
    fn digest_changes_with_tonality() {
        let mut c = [0.0; 12];
        c[0] = 1.0;
        assert_ne!(fingerprint(a_only(), 440.0).digest, fingerprint(c, 440.0).digest);
    }
}
