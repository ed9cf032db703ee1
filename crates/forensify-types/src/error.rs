//! Error taxonomy for analysis operations
//!
//! Every boundary of a single analysis operation catches its own error,
//! logs it with operation context, and converts it to an absent result.
//! Only a failure to write the final report is fatal to a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("remote service returned HTTP {status}: {body}")]
    Network { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("field `{field}` missing from service response")]
    MissingField { field: &'static str },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn write(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether an identical retry has a chance of succeeding.
    ///
    /// The analysis POSTs carry an immutable payload, so transient
    /// transport faults and server-side errors are safe to retry.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::Transport(_) => true,
            AnalysisError::Network { status, .. } => (500..600).contains(status) || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(AnalysisError::Transport("timed out".into()).is_transient());
        assert!(AnalysisError::Network {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!AnalysisError::Network {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!AnalysisError::MissingField {
            field: "transcription"
        }
        .is_transient());
    }
}
