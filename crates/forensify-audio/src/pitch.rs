//! Pitch and frequency analysis
//!
//! Peak-picking pitch tracker over the magnitude spectrogram: each frame
//! contributes the interpolated frequency of its spectral peaks to a
//! time-by-bin matrix, and the summary scalar is the mean over the FULL
//! matrix, zeros included. Averaging in unvoiced cells drags the value
//! well below the perceived pitch; the scalar is a report summary, not
//! a pitch estimate.

use std::path::Path;

use ndarray::Array2;

use forensify_types::{AnalysisError, PitchAnalysis};

use crate::decode::load_audio;
use crate::stft::Stft;

const N_FFT: usize = 2048;
const HOP: usize = 512;
/// A bin must reach this fraction of its frame's maximum to count as a peak
const PEAK_THRESHOLD: f32 = 0.1;

/// Analyze the pitch content of an audio file.
pub fn analyze_pitch(path: &Path) -> Result<PitchAnalysis, AnalysisError> {
    let decoded = load_audio(path)?;
    let matrix = pitch_matrix(&decoded.samples, decoded.sample_rate);

    let mean_pitch = if matrix.is_empty() {
        0.0
    } else {
        matrix.mean().unwrap_or(0.0)
    };

    Ok(PitchAnalysis {
        mean_pitch,
        sample_rate: decoded.sample_rate,
    })
}

/// Time-by-frequency-bin matrix of detected pitches, zero where no peak.
fn pitch_matrix(samples: &[f32], sample_rate: u32) -> Array2<f32> {
    let stft = Stft::new(N_FFT, HOP);
    let magnitudes = stft.magnitudes(samples);
    let num_frames = magnitudes.len();
    let num_bins = stft.num_bins();

    let bin_hz = sample_rate as f32 / N_FFT as f32;
    let mut matrix = Array2::<f32>::zeros((num_frames, num_bins));

    for (t, frame) in magnitudes.iter().enumerate() {
        let frame_max = frame.iter().cloned().fold(0.0f32, f32::max);
        if frame_max <= 0.0 {
            continue;
        }
        let threshold = frame_max * PEAK_THRESHOLD;

        for bin in 1..num_bins - 1 {
            let mag = frame[bin];
            if mag < threshold || mag < frame[bin - 1] || mag < frame[bin + 1] {
                continue;
            }

            // Parabolic interpolation around the peak bin
            let alpha = frame[bin - 1];
            let gamma = frame[bin + 1];
            let denom = alpha - 2.0 * mag + gamma;
            let shift = if denom.abs() > 1e-12 {
                0.5 * (alpha - gamma) / denom
            } else {
                0.0
            };

            matrix[[t, bin]] = (bin as f32 + shift) * bin_hz;
        }
    }

    matrix
}
