//! Shared types for Forensify
//!
//! This crate contains the data model shared across the analysis
//! pipeline: extracted audio metadata, per-analysis outcome slots,
//! and the error taxonomy.

use serde::{Deserialize, Serialize};

mod error;
mod outcome;

pub use error::AnalysisError;
pub use outcome::{Absence, Analysis};

/// Placeholder rendered for any value that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Audio Metadata
// ============================================================================

/// Sample resolution declared by the audio container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitDepth {
    Bits(u32),
    Unknown,
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitDepth::Bits(b) => write!(f, "{}", b),
            BitDepth::Unknown => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}

/// Technical properties of the input file, extracted once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetadata {
    pub filename: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
    pub channels: u16,
    /// Duration in seconds
    pub duration: f64,
    /// Size on disk in bytes
    pub file_size: u64,
    /// Container format derived from the file extension, upper-cased
    pub format: String,
}

// ============================================================================
// Analysis Results
// ============================================================================

/// Upstream anomaly / loudness metrics, interpolated into the report.
///
/// Produced outside this pipeline; every field is optional and missing
/// fields render as the `N/A` placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    /// Mean loudness in dBFS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loudness_mean: Option<f64>,
    /// Peak loudness in dBFS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loudness_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent_segments: Option<u32>,
    /// Longest non-silent span in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_non_silent_segment: Option<f64>,
}

/// Pitch summary from the local time-frequency analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchAnalysis {
    /// Mean over the full time-frequency pitch matrix, in Hz
    pub mean_pitch: f32,
    /// Sample rate the analysis ran at, in Hz
    pub sample_rate: u32,
}

/// Emotion label/score pairs, kept in the order the service returned them.
pub type EmotionScores = Vec<(String, f64)>;
