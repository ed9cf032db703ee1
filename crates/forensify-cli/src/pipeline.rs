//! Analysis pipeline
//!
//! Sequences one full run: metadata extraction, the five remote analyses
//! (independent, run concurrently), the local signal transforms, and a
//! single report composition once every slot has settled. Every slot is
//! absence-tolerant; only the final report write can fail the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use forensify_audio::{analyze_pitch, extract, reduce_noise};
use forensify_remote::{RemoteAnalysisClient, RemoteConfig};
use forensify_report::{compose, ReportInputs};
use forensify_types::{
    Analysis, AnalysisError, AudioMetadata, ContentAnalysis, EmotionScores, PitchAnalysis,
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Report output path
    pub output: PathBuf,
    /// Reference recording for speaker identification
    pub reference: Option<PathBuf>,
    /// Known-voices database for voice recognition
    pub voice_database: Option<PathBuf>,
    /// Upstream anomaly metrics, as a JSON file
    pub content_analysis: Option<PathBuf>,
    pub spectrogram: Option<PathBuf>,
    pub discontinuity: Option<PathBuf>,
    /// Where the denoised audio is written; defaults next to the input
    pub denoised_output: Option<PathBuf>,
    /// Remote service configuration; `None` skips every remote analysis
    pub remote: Option<RemoteConfig>,
}

/// Outcome of one run, printed as the JSON summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub metadata: Analysis<AudioMetadata>,
    pub transcription: Analysis<String>,
    pub emotions: Analysis<EmotionScores>,
    pub speaker_match: Analysis<String>,
    pub noise_reduced: Analysis<PathBuf>,
    pub advanced_tampering: Analysis<serde_json::Value>,
    pub voice_match: Analysis<String>,
    pub pitch: Analysis<PitchAnalysis>,
}

pub async fn run(config: PipelineConfig) -> Result<RunSummary, AnalysisError> {
    let input = config.input.clone();

    let metadata = blocking_slot("metadata extraction", {
        let input = input.clone();
        move || extract(&input)
    })
    .await;

    let denoised_path = config
        .denoised_output
        .clone()
        .unwrap_or_else(|| default_denoised_path(&input));

    // Local transforms and remote calls have no data dependency on each
    // other; everything runs concurrently and the report waits for all.
    let noise_task = blocking_slot("noise reduction", {
        let input = input.clone();
        let output = denoised_path.clone();
        move || reduce_noise(&input, &output)
    });
    let pitch_task = blocking_slot("pitch analysis", {
        let input = input.clone();
        move || analyze_pitch(&input)
    });

    let (noise_reduced, pitch, remote) = tokio::join!(
        noise_task,
        pitch_task,
        run_remote_analyses(&config, &input)
    );

    let content = config
        .content_analysis
        .as_deref()
        .and_then(load_content_analysis);

    let inputs = ReportInputs {
        audio_path: input,
        metadata: metadata.clone(),
        content,
        transcription: remote.transcription.clone(),
        emotions: remote.emotions.clone(),
        speaker_match: remote.speaker_match.clone(),
        noise_reduced_path: noise_reduced.clone(),
        advanced_tampering: remote.advanced_tampering.clone(),
        voice_match: remote.voice_match.clone(),
        pitch: pitch.clone(),
        spectrogram_path: config.spectrogram.clone(),
        discontinuity_path: config.discontinuity.clone(),
    };

    compose(&inputs, &config.output)?;

    Ok(RunSummary {
        report_path: config.output,
        metadata,
        transcription: remote.transcription,
        emotions: remote.emotions,
        speaker_match: remote.speaker_match,
        noise_reduced,
        advanced_tampering: remote.advanced_tampering,
        voice_match: remote.voice_match,
        pitch,
    })
}

struct RemoteSlots {
    transcription: Analysis<String>,
    emotions: Analysis<EmotionScores>,
    speaker_match: Analysis<String>,
    advanced_tampering: Analysis<serde_json::Value>,
    voice_match: Analysis<String>,
}

async fn run_remote_analyses(config: &PipelineConfig, input: &Path) -> RemoteSlots {
    let Some(remote_config) = config.remote.clone() else {
        return RemoteSlots {
            transcription: Analysis::not_requested(),
            emotions: Analysis::not_requested(),
            speaker_match: Analysis::not_requested(),
            advanced_tampering: Analysis::not_requested(),
            voice_match: Analysis::not_requested(),
        };
    };

    let client = RemoteAnalysisClient::new(remote_config);

    let speaker = async {
        match config.reference.as_deref() {
            Some(reference) => client.identify_speaker(input, reference).await,
            None => Analysis::not_requested(),
        }
    };
    let voice = async {
        match config.voice_database.as_deref() {
            Some(database) => client.recognize_voice(input, database).await,
            None => Analysis::not_requested(),
        }
    };

    // The five analyses are independent; issue them concurrently
    let (transcription, emotions, speaker_match, advanced_tampering, voice_match) = tokio::join!(
        client.transcribe(input),
        client.detect_emotions(input),
        speaker,
        client.detect_tampering(input),
        voice,
    );

    RemoteSlots {
        transcription,
        emotions,
        speaker_match,
        advanced_tampering,
        voice_match,
    }
}

/// Run a synchronous operation off the async runtime, converting any
/// failure into an absent slot with the log-and-continue policy.
async fn blocking_slot<T: Send + 'static>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, AnalysisError> + Send + 'static,
) -> Analysis<T> {
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Analysis::Found(value),
        Ok(Err(e)) => {
            tracing::warn!(operation, error = %e, "operation failed, continuing without it");
            Analysis::failed(e.to_string())
        }
        Err(e) => {
            tracing::warn!(operation, error = %e, "operation panicked, continuing without it");
            Analysis::failed(e.to_string())
        }
    }
}

fn default_denoised_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    input.with_file_name(format!("{}_denoised.wav", stem))
}

fn load_content_analysis(path: &Path) -> Option<ContentAnalysis> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "content analysis file unreadable");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "content analysis file invalid");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensify_audio::decode::write_wav;

    fn tone(path: &Path, sample_rate: u32) {
        let samples: Vec<f32> = (0..sample_rate as usize)
            .map(|i| {
                (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin() * 0.4
            })
            .collect();
        write_wav(path, &samples, sample_rate).unwrap();
    }

    fn local_config(dir: &Path) -> PipelineConfig {
        let input = dir.join("evidence.wav");
        tone(&input, 16000);
        PipelineConfig {
            input,
            output: dir.join("report.md"),
            reference: None,
            voice_database: None,
            content_analysis: None,
            spectrogram: None,
            discontinuity: None,
            denoised_output: None,
            remote: None,
        }
    }

    #[tokio::test]
    async fn local_only_run_writes_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        let output = config.output.clone();

        let summary = run(config).await.unwrap();

        assert!(summary.metadata.is_found());
        assert!(summary.noise_reduced.is_found());
        assert!(summary.pitch.is_found());
        assert_eq!(
            summary.transcription,
            forensify_types::Analysis::not_requested()
        );

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.contains("## 2. Technical Characteristics"));
        assert!(report.contains("## 7. Noise Reduction"));
        assert!(report.contains("## 10. Pitch & Frequency Analysis"));
        assert!(!report.contains("## 4. Speech Transcription"));
    }

    #[tokio::test]
    async fn remote_results_land_in_the_report() {
        let mut server = mockito::Server::new_async().await;
        for (path, body) in [
            ("/transcribe", r#"{"transcription": "hello there"}"#),
            ("/emotion", r#"{"emotions": {"calm": 0.9}}"#),
            ("/advanced-tampering", r#"{"tampering_results": "none detected"}"#),
        ] {
            server
                .mock("POST", path)
                .with_status(200)
                .with_body(body)
                .create_async()
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config(dir.path());
        config.remote = Some(RemoteConfig::new("test-key").with_base_url(server.url()));
        let output = config.output.clone();

        let summary = run(config).await.unwrap();
        assert_eq!(summary.transcription, Analysis::Found("hello there".into()));

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.contains("hello there"));
        assert!(report.contains("calm: 0.9"));
        assert!(report.contains("none detected"));
        // No reference or database supplied; those sections stay out
        assert!(!report.contains("## 6. Speaker Identification"));
        assert!(!report.contains("## 9. Voice Recognition"));
    }

    #[tokio::test]
    async fn missing_input_still_produces_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config(dir.path());
        config.input = dir.path().join("gone.wav");
        let output = config.output.clone();

        let summary = run(config).await.unwrap();
        assert!(!summary.metadata.is_found());
        assert!(!summary.pitch.is_found());

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.contains("Sample rate: N/A Hz"));
    }
}
