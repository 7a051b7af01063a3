//! Synthesize-and-play entry point.

use tracing::{error, info};
use tts_core::{AudioSink, DeviceSink, PipelineConfig, PlaybackOutcome, PlaybackPipeline};

use crate::config::ClientConfig;
use crate::error::{SpeakError, TransportError};
use crate::{SynthesisRequest, TtsClient};

/// Per-call replacements for the configured voice settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakOverrides {
    pub text_lang: Option<String>,
    pub prompt_lang: Option<String>,
    pub ref_audio_path: Option<String>,
    pub prompt_text: Option<String>,
    pub temperature: Option<f64>,
    pub fragment_interval: Option<f64>,
    pub speed_factor: Option<f64>,
    pub seed: Option<i64>,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
}

/// Streams synthesized speech from the service straight into a playback
/// pipeline.
pub struct Speaker<S = DeviceSink> {
    client: TtsClient,
    config: ClientConfig,
    pipeline: PlaybackPipeline<S>,
}

impl Speaker<DeviceSink> {
    /// Speaker on the configured output device, configured from the environment.
    pub fn from_env() -> Result<Self, TransportError> {
        let pipeline = PlaybackPipeline::with_device(PipelineConfig::from_env());
        Self::new(ClientConfig::from_env(), pipeline)
    }
}

impl<S: AudioSink> Speaker<S> {
    pub fn new(config: ClientConfig, pipeline: PlaybackPipeline<S>) -> Result<Self, TransportError> {
        let client = TtsClient::from_config(&config)?;
        Ok(Self {
            client,
            config,
            pipeline,
        })
    }

    pub fn client(&self) -> &TtsClient {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &PlaybackPipeline<S> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PlaybackPipeline<S> {
        &mut self.pipeline
    }

    /// Streaming request for `text` with configured defaults and `overrides` applied.
    pub fn request_for(&self, text: &str, overrides: &SpeakOverrides) -> SynthesisRequest {
        self.config.request_for(text, overrides)
    }

    /// Synthesize `text`, stream it through the pipeline and play it.
    ///
    /// Failures are logged and returned; the caller decides whether they matter.
    pub fn speak(&mut self, text: &str, overrides: &SpeakOverrides) -> Result<PlaybackOutcome, SpeakError> {
        let request = self.request_for(text, overrides);

        let result = match self.client.synthesize_to_stream(&request) {
            Ok(stream) => self.pipeline.play_stream(stream).map_err(SpeakError::from),
            Err(e) => Err(SpeakError::from(e)),
        };

        match &result {
            Ok(outcome) => info!("Speak finished: {:?}", outcome),
            Err(e) => error!("TTS synthesis or playback failed: {}", e),
        }
        result
    }
}
