//! Short-time Fourier transform shared by the denoise and pitch stages.

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

pub struct Stft {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl Stft {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        // Symmetric Hann window
        let window: Vec<f32> = (0..n_fft)
            .map(|i| {
                let n = (n_fft - 1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n).cos())
            })
            .collect();

        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(n_fft);
        let inverse = planner.plan_fft_inverse(n_fft);

        Self {
            n_fft,
            hop,
            window,
            forward,
            inverse,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Windowed forward transform of every frame.
    pub fn forward_frames(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        if samples.len() < self.n_fft {
            return Vec::new();
        }

        let num_frames = (samples.len() - self.n_fft) / self.hop + 1;
        let mut frames = Vec::with_capacity(num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop;
            let mut windowed: Vec<f32> = samples[start..start + self.n_fft]
                .iter()
                .zip(self.window.iter())
                .map(|(s, w)| s * w)
                .collect();

            let mut spectrum = vec![Complex::default(); self.num_bins()];
            // realfft only fails on length mismatch, which the sizing above rules out
            let _ = self.forward.process(&mut windowed, &mut spectrum);
            frames.push(spectrum);
        }

        frames
    }

    /// Magnitude spectrogram, one row of `num_bins` values per frame.
    pub fn magnitudes(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.forward_frames(samples)
            .into_iter()
            .map(|spectrum| spectrum.iter().map(|c| c.norm()).collect())
            .collect()
    }

    /// Weighted overlap-add resynthesis of modified spectra.
    pub fn inverse_frames(&self, frames: &[Vec<Complex<f32>>], output_len: usize) -> Vec<f32> {
        let mut output = vec![0.0f32; output_len];
        let mut norm = vec![0.0f32; output_len];
        let scale = 1.0 / self.n_fft as f32;

        for (frame_idx, spectrum) in frames.iter().enumerate() {
            let start = frame_idx * self.hop;
            let mut spectrum = spectrum.clone();
            let mut time = vec![0.0f32; self.n_fft];
            let _ = self.inverse.process(&mut spectrum, &mut time);

            for (i, &t) in time.iter().enumerate() {
                let pos = start + i;
                if pos >= output_len {
                    break;
                }
                let w = self.window[i];
                output[pos] += t * scale * w;
                norm[pos] += w * w;
            }
        }

        for (o, n) in output.iter_mut().zip(norm.iter()) {
            if *n > 1e-8 {
                *o /= *n;
            }
        }

        output
    }
}
