//! HTTP client for the remote analysis service

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use forensify_types::{Absence, Analysis, AnalysisError, EmotionScores};

use crate::endpoint::EndpointKind;

const DEFAULT_API_BASE: &str = "https://api.deepseek.com/v1";

/// Client configuration. The credential is always injected by the caller,
/// never read from the environment or embedded here.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,
    /// Base delay between retries, scaled linearly per attempt
    pub retry_backoff: Duration,
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Uniform wrapper around the five analysis operations.
///
/// The raw `call` surface propagates typed errors; the per-operation
/// methods apply the log-and-continue policy and return `Analysis`
/// slots so one failing operation never aborts its siblings.
pub struct RemoteAnalysisClient {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RemoteAnalysisClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    // ------------------------------------------------------------------
    // Typed operations (result-or-absence)
    // ------------------------------------------------------------------

    /// Transcribe the spoken content of an audio file.
    pub async fn transcribe(&self, audio: &Path) -> Analysis<String> {
        self.analyze(EndpointKind::Transcription, audio, None)
            .await
            .map(value_to_text)
    }

    /// Detect emotions in the speech, keeping the service's label order.
    pub async fn detect_emotions(&self, audio: &Path) -> Analysis<EmotionScores> {
        self.analyze(EndpointKind::EmotionDetection, audio, None)
            .await
            .map(emotions_from_value)
    }

    /// Compare the voice against a reference recording.
    pub async fn identify_speaker(&self, audio: &Path, reference: &Path) -> Analysis<String> {
        self.analyze(EndpointKind::SpeakerIdentification, audio, Some(reference))
            .await
            .map(value_to_text)
    }

    /// Check the recording for advanced manipulation traces.
    pub async fn detect_tampering(&self, audio: &Path) -> Analysis<Value> {
        self.analyze(EndpointKind::AdvancedTampering, audio, None)
            .await
    }

    /// Match the voice against a database of known voices.
    pub async fn recognize_voice(&self, audio: &Path, database: &Path) -> Analysis<String> {
        self.analyze(EndpointKind::VoiceRecognition, audio, Some(database))
            .await
            .map(value_to_text)
    }

    async fn analyze(
        &self,
        kind: EndpointKind,
        primary: &Path,
        secondary: Option<&Path>,
    ) -> Analysis<Value> {
        match self.call(kind, primary, secondary).await {
            Ok(value) => Analysis::Found(value),
            Err(AnalysisError::MissingField { field }) => {
                tracing::warn!(%kind, field, "service answered without the expected field");
                Analysis::Absent(Absence::NotAvailable)
            }
            Err(e) => {
                tracing::warn!(%kind, error = %e, "analysis failed, continuing without it");
                Analysis::failed(e.to_string())
            }
        }
    }

    // ------------------------------------------------------------------
    // Raw call surface
    // ------------------------------------------------------------------

    /// Issue one analysis call and extract the kind's response field.
    ///
    /// Transient faults (timeout, connect failure, 5xx, 429) are retried
    /// up to `max_retries` times; the payload is immutable, so an
    /// identical retry is safe.
    pub async fn call(
        &self,
        kind: EndpointKind,
        primary: &Path,
        secondary: Option<&Path>,
    ) -> Result<Value, AnalysisError> {
        let primary_bytes = read_payload(primary).await?;
        let secondary_bytes = match (kind.secondary_part(), secondary) {
            (Some(_), Some(path)) => Some((file_name(path), read_payload(path).await?)),
            (Some(part), None) => {
                return Err(AnalysisError::Transport(format!(
                    "{} requires a `{}` payload",
                    kind, part
                )))
            }
            (None, _) => None,
        };

        let mut attempt = 0;
        loop {
            let result = self
                .post_once(kind, file_name(primary), &primary_bytes, &secondary_bytes)
                .await;

            match result {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    tracing::debug!(%kind, attempt, error = %e, "retrying after transient failure");
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn post_once(
        &self,
        kind: EndpointKind,
        primary_name: String,
        primary_bytes: &[u8],
        secondary: &Option<(String, Vec<u8>)>,
    ) -> Result<Value, AnalysisError> {
        let mut form = Form::new().part(
            kind.primary_part(),
            Part::bytes(primary_bytes.to_vec()).file_name(primary_name),
        );
        if let (Some(part), Some((name, bytes))) = (kind.secondary_part(), secondary.as_ref()) {
            form = form.part(part, Part::bytes(bytes.clone()).file_name(name.clone()));
        }

        let url = format!("{}{}", self.config.base_url, kind.path());
        tracing::debug!(%kind, %url, "remote analysis request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Transport("request timed out".to_string())
                } else {
                    AnalysisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Network {
                status: status.as_u16(),
                body,
            });
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Transport(format!("invalid JSON response: {}", e)))?;

        match body.get_mut(kind.response_field()) {
            Some(value) => Ok(value.take()),
            None => Err(AnalysisError::MissingField {
                field: kind.response_field(),
            }),
        }
    }
}

async fn read_payload(path: &Path) -> Result<Vec<u8>, AnalysisError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| AnalysisError::file_read(path.display().to_string(), e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("payload")
        .to_string()
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Flatten the service's emotion object into ordered label/score pairs.
fn emotions_from_value(value: Value) -> EmotionScores {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(label, score)| score.as_f64().map(|s| (label, s)))
            .collect(),
        _ => Vec::new(),
    }
}
