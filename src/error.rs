use std::time::Duration;

use thiserror::Error;

/// Why a single audio tier could not produce sound. Never crosses the
/// resolver boundary; the resolver logs it and moves to the next tier.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio asset for {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("response carried no audio payload")]
    NoAudio,
    #[error("malformed audio: {0}")]
    Decode(String),
    #[error("no credentials configured for {0}")]
    MissingCredentials(&'static str),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("speech engine: {0}")]
    Speech(String),
}

impl From<base64::DecodeError> for AudioError {
    fn from(e: base64::DecodeError) -> Self {
        AudioError::Decode(format!("base64: {e}"))
    }
}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        AudioError::Decode(format!("wav: {e}"))
    }
}

/// Why a drawing could not be classified. Every variant becomes a negative
/// verdict at the verifier boundary.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no credentials configured for {0}")]
    MissingCredentials(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("could not encode drawing: {0}")]
    Encode(#[from] image::ImageError),
    #[error("empty canvas")]
    EmptyCanvas,
    #[error("response carried no text")]
    EmptyResponse,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_error_maps_to_decode() {
        use base64::Engine;
        let err: AudioError = base64::engine::general_purpose::STANDARD
            .decode("***")
            .unwrap_err()
            .into();
        assert!(matches!(err, AudioError::Decode(msg) if msg.starts_with("base64")));
    }

    #[test]
    fn test_messages_name_the_provider() {
        let err = AudioError::MissingCredentials("gemini");
        assert_eq!(err.to_string(), "no credentials configured for gemini");
        let err = VerifyError::MissingCredentials("openai-compatible");
        assert!(err.to_string().contains("openai-compatible"));
    }
}
