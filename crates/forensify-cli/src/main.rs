//! Forensify driver
//!
//! Runs one forensic analysis pass over an audio file and writes the
//! report. Remote analyses need a credential, supplied via flag or the
//! `FORENSIFY_API_KEY` environment variable; without one the run stays
//! local-only.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forensify_remote::RemoteConfig;

mod pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Audio file to analyze
    #[arg()]
    input: PathBuf,

    /// Report output path
    #[arg(long, short, default_value = "report.md")]
    output: PathBuf,

    /// Reference recording for speaker identification
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Known-voices database for voice recognition
    #[arg(long)]
    voice_database: Option<PathBuf>,

    /// JSON file with upstream anomaly/loudness metrics
    #[arg(long)]
    content_analysis: Option<PathBuf>,

    /// Pre-rendered spectrogram image
    #[arg(long)]
    spectrogram: Option<PathBuf>,

    /// Pre-rendered discontinuity plot
    #[arg(long)]
    discontinuity: Option<PathBuf>,

    /// Where to write the denoised audio (defaults next to the input)
    #[arg(long)]
    denoised_output: Option<PathBuf>,

    /// Remote service credential; falls back to FORENSIFY_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Remote service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout for remote calls, in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Retries per remote call after a transient failure
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Skip every remote analysis
    #[arg(long)]
    skip_remote: bool,
}

impl Args {
    fn remote_config(&self) -> Option<RemoteConfig> {
        if self.skip_remote {
            return None;
        }

        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("FORENSIFY_API_KEY").ok());

        let Some(api_key) = api_key else {
            tracing::warn!("no API credential supplied, running local analyses only");
            return None;
        };

        let mut config = RemoteConfig::new(api_key);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.max_retries = self.max_retries;
        Some(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = pipeline::PipelineConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        reference: args.reference.clone(),
        voice_database: args.voice_database.clone(),
        content_analysis: args.content_analysis.clone(),
        spectrogram: args.spectrogram.clone(),
        discontinuity: args.discontinuity.clone(),
        denoised_output: args.denoised_output.clone(),
        remote: args.remote_config(),
    };

    let summary = pipeline::run(config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
