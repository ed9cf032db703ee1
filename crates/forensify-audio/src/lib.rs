//! Audio decoding, metadata extraction and local signal processing.

pub mod decode;
pub mod denoise;
pub mod info;
pub mod pitch;
mod stft;

pub use decode::{load_audio, DecodedAudio};
pub use denoise::reduce_noise;
pub use info::extract;
pub use pitch::analyze_pitch;
