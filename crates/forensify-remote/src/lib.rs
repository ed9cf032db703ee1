//! Remote speech-analysis client
//!
//! One logical service, five operation kinds. Every call uploads the audio
//! payload as multipart form data with a bearer credential and extracts a
//! single named field from the JSON response body.

mod client;
mod endpoint;

pub use client::{RemoteAnalysisClient, RemoteConfig};
pub use endpoint::EndpointKind;
