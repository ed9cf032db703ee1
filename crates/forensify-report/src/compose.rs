//! Report assembly
//!
//! Fixed sections 1-3 always render, with `N/A` placeholders for any
//! value that could not be determined. Optional sections keep their
//! fixed numbers regardless of which neighbours are present. A slot
//! whose service answered "nothing found" still gets its section, with
//! an `N/A` body; a failed or unrequested slot is omitted entirely.

use std::path::{Path, PathBuf};

use serde_json::Value;

use forensify_types::{
    Analysis, AnalysisError, AudioMetadata, ContentAnalysis, EmotionScores, PitchAnalysis,
    NOT_AVAILABLE,
};

use crate::block::Block;
use crate::markdown;

/// Everything a report is built from. Each analysis slot is independent
/// and optional.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    /// Path of the file under analysis; names the report even when
    /// metadata extraction failed
    pub audio_path: PathBuf,
    pub metadata: Analysis<AudioMetadata>,
    pub content: Option<ContentAnalysis>,
    pub transcription: Analysis<String>,
    pub emotions: Analysis<EmotionScores>,
    pub speaker_match: Analysis<String>,
    pub noise_reduced_path: Analysis<PathBuf>,
    pub advanced_tampering: Analysis<Value>,
    pub voice_match: Analysis<String>,
    pub pitch: Analysis<PitchAnalysis>,
    pub spectrogram_path: Option<PathBuf>,
    pub discontinuity_path: Option<PathBuf>,
}

impl ReportInputs {
    /// Inputs with every analysis slot unrequested.
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
            metadata: Analysis::not_requested(),
            content: None,
            transcription: Analysis::not_requested(),
            emotions: Analysis::not_requested(),
            speaker_match: Analysis::not_requested(),
            noise_reduced_path: Analysis::not_requested(),
            advanced_tampering: Analysis::not_requested(),
            voice_match: Analysis::not_requested(),
            pitch: Analysis::not_requested(),
            spectrogram_path: None,
            discontinuity_path: None,
        }
    }

    fn filename(&self) -> String {
        self.audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Compose the report and write it to `output_path`.
///
/// The write is the only fatal failure of a whole analysis run.
pub fn compose(inputs: &ReportInputs, output_path: &Path) -> Result<(), AnalysisError> {
    let document = markdown::render(&build_blocks(inputs));

    std::fs::write(output_path, document)
        .map_err(|e| AnalysisError::write(output_path.display().to_string(), e))?;

    tracing::info!(report = %output_path.display(), "report written");
    Ok(())
}

/// Build the ordered block list for the report.
pub fn build_blocks(inputs: &ReportInputs) -> Vec<Block> {
    let mut blocks = Vec::new();
    let meta = inputs.metadata.as_found();

    blocks.push(Block::Title(format!(
        "Forensic Technical Report on Audio File \"{}\"",
        inputs.filename()
    )));
    blocks.push(Block::Spacer);

    // 1. Introduction
    let format = meta
        .map(|m| m.format.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    section(
        &mut blocks,
        "1. Introduction",
        format!(
            "The audio file under analysis, \"{}\", was received in \"{}\" format \
             and has undergone a complete forensic examination.",
            inputs.filename(),
            format
        ),
    );

    // 2. Technical Characteristics
    section(
        &mut blocks,
        "2. Technical Characteristics",
        [
            "The file has the following overall properties:".to_string(),
            String::new(),
            format!("Total duration: {} seconds", opt(meta.map(|m| m.duration))),
            format!("Format: {}", format),
            format!("Audio channels: {}", opt(meta.map(|m| m.channels))),
            format!("Sample rate: {} Hz", opt(meta.map(|m| m.sample_rate))),
            format!("Sample resolution: {} bit", opt(meta.map(|m| m.bit_depth))),
            format!("File size: {} bytes", opt(meta.map(|m| m.file_size))),
        ]
        .join("\n"),
    );

    // 3. Content Analysis
    let content = inputs.content.clone().unwrap_or_default();
    section(
        &mut blocks,
        "3. Content Analysis",
        [
            format!("Duration: {} seconds", opt(meta.map(|m| m.duration))),
            format!("Mean loudness: {} dBFS", opt(content.loudness_mean)),
            format!("Peak loudness: {} dBFS", opt(content.loudness_max)),
            format!("Silent segments identified: {}", opt(content.silent_segments)),
            format!(
                "Longest non-silent segment: {} seconds",
                opt(content.longest_non_silent_segment)
            ),
        ]
        .join("\n"),
    );

    // 4-10. Optional sections, fixed numbering
    if let Some(body) = slot(&inputs.transcription, |t| t.clone()) {
        section(&mut blocks, "4. Speech Transcription", body);
    }
    if let Some(body) = slot(&inputs.emotions, render_emotions) {
        section(&mut blocks, "5. Emotion Detection", body);
    }
    if let Some(body) = slot(&inputs.speaker_match, |m| format!("Result: {}", m)) {
        section(&mut blocks, "6. Speaker Identification", body);
    }
    if let Some(body) = slot(&inputs.noise_reduced_path, |p| {
        format!("Cleaned audio file saved at: {}", p.display())
    }) {
        section(&mut blocks, "7. Noise Reduction", body);
    }
    if let Some(body) = slot(&inputs.advanced_tampering, |v| {
        format!("Results: {}", render_value(v))
    }) {
        section(&mut blocks, "8. Advanced Tampering Detection", body);
    }
    if let Some(body) = slot(&inputs.voice_match, |m| format!("Result: {}", m)) {
        section(&mut blocks, "9. Voice Recognition", body);
    }
    if let Some(body) = slot(&inputs.pitch, |p| {
        format!(
            "Mean pitch: {} Hz\nSample rate: {} Hz",
            p.mean_pitch, p.sample_rate
        )
    }) {
        section(&mut blocks, "10. Pitch & Frequency Analysis", body);
    }

    // Image sections, included only if the file exists at compose time
    image_section(&mut blocks, "Spectrogram", inputs.spectrogram_path.as_deref());
    image_section(
        &mut blocks,
        "Discontinuity Analysis",
        inputs.discontinuity_path.as_deref(),
    );

    blocks
}

fn section(blocks: &mut Vec<Block>, heading: &str, body: String) {
    blocks.push(Block::Heading(heading.to_string()));
    blocks.push(Block::Paragraph(body));
    blocks.push(Block::Spacer);
}

fn image_section(blocks: &mut Vec<Block>, heading: &str, path: Option<&Path>) {
    if let Some(path) = path.filter(|p| p.exists()) {
        blocks.push(Block::Heading(heading.to_string()));
        blocks.push(Block::Image {
            alt: heading.to_string(),
            path: path.to_path_buf(),
        });
        blocks.push(Block::Spacer);
    }
}

/// Section body for an analysis slot: the rendered value when found,
/// the `N/A` placeholder when the service had nothing, no section
/// otherwise.
fn slot<T>(analysis: &Analysis<T>, render: impl Fn(&T) -> String) -> Option<String> {
    match analysis {
        Analysis::Found(v) => Some(render(v)),
        _ if analysis.is_reportable() => Some(NOT_AVAILABLE.to_string()),
        _ => None,
    }
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn render_emotions(emotions: &EmotionScores) -> String {
    emotions
        .iter()
        .map(|(label, score)| format!("{}: {}", label, score))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensify_types::{Absence, BitDepth};

    fn metadata() -> AudioMetadata {
        AudioMetadata {
            filename: "evidence.wav".into(),
            sample_rate: 44100,
            bit_depth: BitDepth::Bits(16),
            channels: 2,
            duration: 12.5,
            file_size: 2_205_000,
            format: "WAV".into(),
        }
    }

    fn headings(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn all_slots_absent_yields_exactly_the_mandatory_sections() {
        let inputs = ReportInputs::new("evidence.wav");
        let blocks = build_blocks(&inputs);

        assert_eq!(
            headings(&blocks),
            vec![
                "1. Introduction",
                "2. Technical Characteristics",
                "3. Content Analysis"
            ]
        );
    }

    #[test]
    fn missing_metadata_renders_placeholders() {
        let inputs = ReportInputs::new("clip.mp3");
        let blocks = build_blocks(&inputs);

        let tech = blocks
            .iter()
            .find_map(|b| match b {
                Block::Paragraph(p) if p.contains("Sample rate") => Some(p.clone()),
                _ => None,
            })
            .unwrap();
        assert!(tech.contains("Sample rate: N/A Hz"));
        assert!(tech.contains("Sample resolution: N/A bit"));
    }

    #[test]
    fn emotion_section_renders_lines_in_insertion_order() {
        let mut inputs = ReportInputs::new("evidence.wav");
        inputs.emotions =
            Analysis::Found(vec![("happy".into(), 0.8), ("angry".into(), 0.1)]);

        let blocks = build_blocks(&inputs);
        let body = blocks
            .iter()
            .zip(blocks.iter().skip(1))
            .find_map(|(a, b)| match (a, b) {
                (Block::Heading(h), Block::Paragraph(p)) if h == "5. Emotion Detection" => {
                    Some(p.clone())
                }
                _ => None,
            })
            .unwrap();

        assert_eq!(body, "happy: 0.8\nangry: 0.1");
    }

    #[test]
    fn not_available_slot_still_gets_a_section_with_placeholder() {
        let mut inputs = ReportInputs::new("evidence.wav");
        inputs.transcription = Analysis::Absent(Absence::NotAvailable);
        inputs.voice_match = Analysis::failed("HTTP 500");

        let blocks = build_blocks(&inputs);
        let heads = headings(&blocks);
        assert!(heads.contains(&"4. Speech Transcription".to_string()));
        assert!(!heads.contains(&"9. Voice Recognition".to_string()));

        let body = blocks
            .iter()
            .zip(blocks.iter().skip(1))
            .find_map(|(a, b)| match (a, b) {
                (Block::Heading(h), Block::Paragraph(p)) if h == "4. Speech Transcription" => {
                    Some(p.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(body, "N/A");
    }

    #[test]
    fn section_numbers_stay_fixed_when_neighbours_are_absent() {
        let mut inputs = ReportInputs::new("evidence.wav");
        inputs.pitch = Analysis::Found(PitchAnalysis {
            mean_pitch: 97.4,
            sample_rate: 44100,
        });

        let heads = headings(&build_blocks(&inputs));
        assert_eq!(heads.last().unwrap(), "10. Pitch & Frequency Analysis");
    }

    #[test]
    fn image_sections_require_the_file_to_exist() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("spectrogram.png");
        std::fs::write(&present, b"png").unwrap();

        let mut inputs = ReportInputs::new("evidence.wav");
        inputs.metadata = Analysis::Found(metadata());
        inputs.spectrogram_path = Some(present);
        inputs.discontinuity_path = Some(dir.path().join("missing.png"));

        let heads = headings(&build_blocks(&inputs));
        assert!(heads.contains(&"Spectrogram".to_string()));
        assert!(!heads.contains(&"Discontinuity Analysis".to_string()));
    }

    #[test]
    fn compose_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.md");

        let mut inputs = ReportInputs::new("evidence.wav");
        inputs.metadata = Analysis::Found(metadata());
        inputs.transcription = Analysis::Found("hello world".into());

        compose(&inputs, &output).unwrap();
        let first = std::fs::read(&output).unwrap();
        compose(&inputs, &output).unwrap();
        let second = std::fs::read(&output).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unwritable_output_path_is_fatal() {
        let inputs = ReportInputs::new("evidence.wav");
        let err = compose(&inputs, Path::new("/nonexistent/dir/report.md")).unwrap_err();
        assert!(matches!(err, AnalysisError::Write { .. }));
    }
}
