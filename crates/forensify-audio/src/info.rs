//! Technical metadata extraction

use std::path::Path;

use forensify_types::{AnalysisError, AudioMetadata, BitDepth};

use crate::decode::load_audio;

/// Derive the container format label from the file extension.
///
/// Pure function of the last extension component, upper-cased:
/// `clip.tar.flac` yields `FLAC`, a bare filename yields an empty string.
pub fn format_from_path(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_uppercase()
}

/// Extract the technical properties of an audio file.
///
/// Decodes the file once and combines the container header with the size
/// on disk. Fails on unreadable paths, corrupt headers and unsupported
/// codecs; callers treat the failure as "metadata unavailable".
pub fn extract(path: &Path) -> Result<AudioMetadata, AnalysisError> {
    let decoded = load_audio(path)?;

    let file_size = std::fs::metadata(path)
        .map_err(|e| AnalysisError::file_read(path.display().to_string(), e))?
        .len();

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(AudioMetadata {
        filename,
        sample_rate: decoded.sample_rate,
        bit_depth: decoded
            .bits_per_sample
            .map_or(BitDepth::Unknown, BitDepth::Bits),
        channels: decoded.channels,
        duration: decoded.duration_seconds(),
        file_size,
        format: format_from_path(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::write_wav;

    #[test]
    fn format_derivation() {
        assert_eq!(format_from_path(Path::new("clip.WAV")), "WAV");
        assert_eq!(format_from_path(Path::new("clip.tar.flac")), "FLAC");
        assert_eq!(format_from_path(Path::new("clip")), "");
    }

    #[test]
    fn extract_reports_actual_file_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.wav");
        let samples = vec![0.0f32; 44100];
        write_wav(&path, &samples, 44100).unwrap();

        let meta = extract(&path).unwrap();
        assert_eq!(meta.filename, "evidence.wav");
        assert_eq!(meta.format, "WAV");
        assert_eq!(meta.sample_rate, 44100);
        assert_eq!(meta.channels, 1);
        assert_eq!(meta.bit_depth, BitDepth::Bits(16));
        assert!(meta.duration >= 0.0);
        assert!((meta.duration - 1.0).abs() < 1e-6);
        assert_eq!(meta.file_size, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn extract_fails_on_missing_file() {
        assert!(extract(Path::new("/nonexistent/clip.wav")).is_err());
    }
}
