use thiserror::Error;

/// Raised when raw bytes cannot be interpreted with the stream's layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported sample width: {0} bytes")]
    UnsupportedSampleWidth(u16),
}

/// Output device errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("No output configuration for {channels} channel(s) at {sample_rate} Hz: {reason}")]
    UnsupportedConfig {
        channels: u16,
        sample_rate: u32,
        reason: String,
    },

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Resampling from {from} Hz to {to} Hz failed: {reason}")]
    Resample { from: u32, to: u32, reason: String },

    #[error("Playback did not finish within {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors surfaced by one decode-and-play pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The chunk source failed before the stream was exhausted.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("WAV file error: {0}")]
    File(#[from] hound::Error),
}

impl PipelineError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        PipelineError::Transport(err.into())
    }
}
