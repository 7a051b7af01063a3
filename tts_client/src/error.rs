use thiserror::Error;
use tts_core::PipelineError;

/// Failures talking to the synthesis service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TTS request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`crate::Speaker::speak`].
#[derive(Debug, Error)]
pub enum SpeakError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
