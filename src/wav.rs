use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::constants::PCM_SCALE;
use crate::error::{Result, VocalsError};

/// Write samples as a 16-bit PCM WAV file.
///
/// Samples are expected in [-1, 1]; values outside are clamped rather than
/// wrapped.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| VocalsError::Wav(format!("{}", e)))?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * PCM_SCALE) as i16;
        writer
            .write_sample(value)
            .map_err(|e| VocalsError::Wav(format!("{}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| VocalsError::Wav(format!("{}", e)))?;
    Ok(())
}

/// Read a WAV file into float samples plus its spec.
///
/// Integer formats are normalized to [-1, 1]; float files pass through.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader =
        WavReader::open(path.as_ref()).map_err(|e| VocalsError::Wav(format!("{}", e)))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VocalsError::Wav(format!("{}", e)))?,
        SampleFormat::Int => {
            let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| VocalsError::Wav(format!("{}", e)))?
        }
    };

    Ok((samples, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("vocals_wav_{}_{}", std::process::id(), name))
    }

    #[test]
    fn round_trip_pcm16() {
        let path = temp_path("round_trip.wav");
        let data = vec![0.0, 0.5, -0.5, 1.0, -1.0];

        save_wav(&path, &data, 44100, 1).unwrap();
        let (loaded, spec) = load_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.channels, 1);
        assert_eq!(loaded.len(), data.len());
        for (a, b) in loaded.iter().zip(&data) {
            assert!((a - b).abs() < 1e-3, "expected {}, got {}", b, a);
        }
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let path = temp_path("clamp.wav");
        save_wav(&path, &[2.0, -2.0], 8000, 1).unwrap();
        let (loaded, _) = load_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!((loaded[0] - 1.0).abs() < 1e-3);
        assert!((loaded[1] + 1.0).abs() < 1e-3);
    }
}
