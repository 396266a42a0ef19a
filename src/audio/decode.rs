use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::buffer::SampleBuffer;
use crate::error::{AnalysisError, Result};

pub fn decode_file(path: &Path) -> Result<SampleBuffer> {
    let file = std::fs::File::open(path).map_err(|e| AnalysisError::decode(path, e))?;
    decode_source(path, Box::new(file))
}

/// Decode an in-memory encoded file. `path` is only used for the format hint
/// and error messages.
pub fn decode_bytes(path: &Path, bytes: Vec<u8>) -> Result<SampleBuffer> {
    decode_source(path, Box::new(std::io::Cursor::new(bytes)))
}

fn decode_source(path: &Path, source: Box<dyn symphonia::core::io::MediaSource>) -> Result<SampleBuffer> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AnalysisError::decode(path, format!("failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::decode(path, "no audio tracks found"))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count()).max(1);
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::decode(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::decode(path, format!("failed to create decoder: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AnalysisError::decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                log::debug!("Skipping corrupt packet in {}: {}", path.display(), msg);
                continue;
            }
            Err(e) => return Err(AnalysisError::decode(path, e)),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut pcm = PcmBuffer::<f32>::new(num_frames as u64, spec);
        pcm.copy_interleaved_ref(decoded);

        let samples = pcm.samples();

        // Downmix to mono
        if channels == 1 {
            all_samples.extend_from_slice(samples);
        } else {
            for frame_samples in samples.chunks(channels) {
                let mono: f32 = frame_samples.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        }
    }

    log::info!(
        "Decoded {}: {} samples, {}Hz, {:.1}s",
        path.display(),
        all_samples.len(),
        sample_rate,
        all_samples.len() as f32 / sample_rate as f32
    );

    SampleBuffer::new(all_samples, sample_rate)
        .map_err(|e| AnalysisError::decode(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, frames: &[[i16; 2]]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in &frame[..channels as usize] {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn downmixes_stereo_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<[i16; 2]> = (0..800).map(|_| [16384, 0]).collect();
        write_wav(&path, 2, &frames);

        let buffer = decode_file(&path).unwrap();
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.len(), 800);
        assert!(buffer.samples().iter().all(|&s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = decode_bytes(Path::new("noise.wav"), vec![7u8; 512]).unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_a_decode_failure() {
        let err = decode_file(Path::new("/definitely/not/here.flac")).unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }));
    }
}
