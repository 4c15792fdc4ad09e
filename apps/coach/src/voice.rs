//! Voice capability: speech synthesis and capture behind a trait so the
//! interview logic never touches an audio device.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AppError;

#[async_trait]
pub trait Voice: Send + Sync {
    /// Fire-and-forget: read `text` aloud.
    fn speak(&self, text: &str);

    /// Capture one spoken answer and return its transcript.
    async fn capture_speech(&self) -> Result<String, AppError>;
}

/// No audio device: speech is dropped and capture is unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentVoice;

#[async_trait]
impl Voice for SilentVoice {
    fn speak(&self, text: &str) {
        debug!("(speech disabled) {text}");
    }

    async fn capture_speech(&self) -> Result<String, AppError> {
        Err(AppError::Validation(
            "Speech recognition not supported.".to_string(),
        ))
    }
}
