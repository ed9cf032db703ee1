//! Operation kinds of the remote analysis service
//!
//! Each kind fixes its URL path, the name of the field extracted from a
//! successful response, and the multipart layout of the upload.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Transcription,
    EmotionDetection,
    SpeakerIdentification,
    AdvancedTampering,
    VoiceRecognition,
}

impl EndpointKind {
    /// URL path below the service base
    pub fn path(&self) -> &'static str {
        match self {
            EndpointKind::Transcription => "/transcribe",
            EndpointKind::EmotionDetection => "/emotion",
            EndpointKind::SpeakerIdentification => "/speaker-identification",
            EndpointKind::AdvancedTampering => "/advanced-tampering",
            EndpointKind::VoiceRecognition => "/voice-recognition",
        }
    }

    /// Field extracted from the HTTP 200 JSON body
    pub fn response_field(&self) -> &'static str {
        match self {
            EndpointKind::Transcription => "transcription",
            EndpointKind::EmotionDetection => "emotions",
            EndpointKind::SpeakerIdentification => "match",
            EndpointKind::AdvancedTampering => "tampering_results",
            EndpointKind::VoiceRecognition => "voice_match",
        }
    }

    /// Multipart part name for the primary audio payload
    pub fn primary_part(&self) -> &'static str {
        match self {
            EndpointKind::SpeakerIdentification => "file1",
            _ => "file",
        }
    }

    /// Multipart part name for the secondary payload, if this kind takes one
    pub fn secondary_part(&self) -> Option<&'static str> {
        match self {
            EndpointKind::SpeakerIdentification => Some("file2"),
            EndpointKind::VoiceRecognition => Some("database"),
            _ => None,
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EndpointKind::Transcription => "transcription",
            EndpointKind::EmotionDetection => "emotion detection",
            EndpointKind::SpeakerIdentification => "speaker identification",
            EndpointKind::AdvancedTampering => "advanced tampering detection",
            EndpointKind::VoiceRecognition => "voice recognition",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_layout_per_kind() {
        assert_eq!(EndpointKind::Transcription.primary_part(), "file");
        assert_eq!(EndpointKind::Transcription.secondary_part(), None);
        assert_eq!(EndpointKind::SpeakerIdentification.primary_part(), "file1");
        assert_eq!(
            EndpointKind::SpeakerIdentification.secondary_part(),
            Some("file2")
        );
        assert_eq!(
            EndpointKind::VoiceRecognition.secondary_part(),
            Some("database")
        );
    }

    #[test]
    fn response_fields_match_the_service_contract() {
        assert_eq!(EndpointKind::Transcription.response_field(), "transcription");
        assert_eq!(EndpointKind::EmotionDetection.response_field(), "emotions");
        assert_eq!(EndpointKind::SpeakerIdentification.response_field(), "match");
        assert_eq!(
            EndpointKind::AdvancedTampering.response_field(),
            "tampering_results"
        );
        assert_eq!(EndpointKind::VoiceRecognition.response_field(), "voice_match");
    }
}
