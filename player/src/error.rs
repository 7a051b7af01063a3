use thiserror::Error;
use tts_client::{SpeakError, TransportError};
use tts_core::{PipelineError, SinkError};

/// Command-line error types
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("TTS error: {0}")]
    Speak(#[from] SpeakError),

    #[error("TTS service error: {0}")]
    Transport(#[from] TransportError),

    #[error("Playback error: {0}")]
    Playback(#[from] PipelineError),

    #[error("Audio device error: {0}")]
    Device(#[from] SinkError),
}
