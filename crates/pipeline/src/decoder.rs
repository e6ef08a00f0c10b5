//! Audio Decoder (C1, §4.1).
//!
//! Decodes a WAV container to mono PCM at the target sample rate, grounded
//! in the teacher's use of `hound` for WAV I/O and `rubato` for resampling.
//! Other containers are explicitly out of this crate's reach (§1
//! Non-goals: "support for media formats that a stock audio decoder cannot
//! handle").

use std::io::Cursor;

use rubato::{FftFixedInOut, Resampler};
use subtitle_core::{PcmBuffer, PipelineError, Result};

/// Decode `file_bytes` (a WAV file) into mono PCM at `target_sample_rate`.
pub fn decode(file_bytes: &[u8], target_sample_rate: u32) -> Result<PcmBuffer> {
    let cursor = Cursor::new(file_bytes);
    let mut reader = hound::WavReader::new(cursor)
        .map_err(|e| PipelineError::Decode(format!("unsupported container: {e}")))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| PipelineError::Decode(format!("malformed sample data: {e}")))?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| PipelineError::Decode(format!("malformed sample data: {e}")))?
        }
    };

    let mono = downmix(&samples, spec.channels as usize);
    let resampled = if spec.sample_rate == target_sample_rate {
        mono
    } else {
        resample(&mono, spec.sample_rate, target_sample_rate)?
    };

    Ok(PcmBuffer::new(resampled, target_sample_rate))
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    let chunk_size = samples.len();
    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, chunk_size, 1)
            .map_err(|e| PipelineError::Decode(format!("resampler init failed: {e}")))?;

    let input_frames = resampler.input_frames_next();
    let mut padded = samples.to_vec();
    padded.resize(input_frames, 0.0);

    let output = resampler
        .process(&[padded], None)
        .map_err(|e| PipelineError::Decode(format!("resample failed: {e}")))?;

    Ok(output.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut buf = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buf
    }

    #[test]
    fn decodes_matching_sample_rate_without_resampling() {
        let samples = vec![0.0f32; 1_600];
        let wav = write_wav(&samples, 16_000);
        let pcm = decode(&wav, 16_000).unwrap();
        assert_eq!(pcm.sample_rate, 16_000);
        assert_eq!(pcm.len(), 1_600);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = decode(b"not a wav file", 16_000);
        assert!(err.is_err());
    }

    /// Exercises the path a real caller takes: a WAV file on disk, read back
    /// through a file handle rather than an in-memory buffer.
    #[test]
    fn decodes_a_wav_file_written_to_disk() {
        let samples = vec![0.25f32; 3_200];
        let wav = write_wav(&samples, 16_000);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.wav");
        std::fs::write(&path, &wav).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let pcm = decode(&bytes, 16_000).unwrap();
        assert_eq!(pcm.len(), 3_200);
    }

    #[test]
    fn resamples_a_wav_file_written_to_disk() {
        let samples = vec![0.1f32; 8_000];
        let wav = write_wav(&samples, 8_000);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.wav");
        std::fs::write(&path, &wav).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let pcm = decode(&bytes, 16_000).unwrap();
        assert_eq!(pcm.sample_rate, 16_000);
        assert!(pcm.len() > 0);
    }
}
