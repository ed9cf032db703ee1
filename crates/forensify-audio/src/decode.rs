//! Audio file decoding
//!
//! WAV goes through hound, everything else through symphonia. Samples are
//! downmixed to mono but kept at the source sample rate; the forensic
//! transforms must not alter the timebase of the evidence file.

use std::path::Path;

use forensify_types::AnalysisError;

/// Decoded audio plus the container properties the metadata report needs.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in -1.0..=1.0, at the source rate
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source file, before downmix
    pub channels: u16,
    /// Declared sample resolution, if the codec exposes one
    pub bits_per_sample: Option<u32>,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Load and decode an audio file.
pub fn load_audio(path: &Path) -> Result<DecodedAudio, AnalysisError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "wav" => load_wav(path),
        "mp3" | "m4a" | "ogg" | "flac" => load_with_symphonia(path),
        other => Err(AnalysisError::UnsupportedFormat(other.to_string())),
    }
}

fn load_wav(path: &Path) -> Result<DecodedAudio, AnalysisError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| AnalysisError::decode(path.display().to_string(), e.to_string()))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels;
    let bits = spec.bits_per_sample as u32;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .filter_map(|s| s.ok())
            .collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    Ok(DecodedAudio {
        samples: downmix(samples, channels as usize),
        sample_rate,
        channels,
        bits_per_sample: Some(bits),
    })
}

fn load_with_symphonia(path: &Path) -> Result<DecodedAudio, AnalysisError> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| AnalysisError::file_read(&display, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let hint = Hint::new();
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| AnalysisError::decode(&display, e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AnalysisError::decode(&display, "no audio track found"))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::decode(&display, "unknown sample rate"))?;
    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| AnalysisError::decode(&display, "unknown channel count"))?
        .count();
    let bits_per_sample = track.codec_params.bits_per_sample;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| AnalysisError::decode(&display, e.to_string()))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(_) => break,
        };

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AnalysisError::decode(&display, e.to_string()))?;
        let spec = *decoded.spec();

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        samples.extend_from_slice(sample_buf.samples());
    }

    Ok(DecodedAudio {
        samples: downmix(samples, channels),
        sample_rate,
        channels: channels as u16,
        bits_per_sample,
    })
}

fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    }
}

/// Write mono samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AnalysisError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let display = path.display().to_string();
    let io_err = |e: hound::Error| match e {
        hound::Error::IoError(io) => AnalysisError::write(&display, io),
        other => AnalysisError::write(
            &display,
            std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        ),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(io_err)?;
    for &sample in samples {
        let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(sample_i16).map_err(io_err)?;
    }
    writer.finalize().map_err(io_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, freq: f32, sample_rate: u32, seconds: f32) {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5
            })
            .collect();
        write_wav(path, &samples, sample_rate).unwrap();
    }

    #[test]
    fn wav_round_trip_keeps_rate_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 440.0, 22050, 0.5);

        let decoded = load_audio(&path).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.bits_per_sample, Some(16));
        assert_eq!(decoded.samples.len(), 11025);
        assert!((decoded.duration_seconds() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_audio(Path::new("evidence.xyz")).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(ext) if ext == "xyz"));
    }
}
