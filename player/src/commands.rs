use std::path::Path;

use tracing::info;
use tts_client::{SpeakOverrides, Speaker, TtsClient};
use tts_core::sink::list_output_devices;
use tts_core::{PlaybackOutcome, PlaybackPipeline};

use crate::config::PlayerConfig;
use crate::error::CliError;
use crate::validation::validate_request;

/// Stream `text` from the service and play it on the configured device.
pub fn speak(config: &PlayerConfig, text: &str, overrides: &SpeakOverrides) -> Result<PlaybackOutcome, CliError> {
    validate_request(&config.client.request_for(text, overrides))?;

    let pipeline = PlaybackPipeline::with_device(config.pipeline.clone());
    let mut speaker = Speaker::new(config.client.clone(), pipeline)?;
    Ok(speaker.speak(text, overrides)?)
}

/// Synthesize `text` in one response and write it to `output`.
pub fn save(config: &PlayerConfig, text: &str, output: &Path, overrides: &SpeakOverrides) -> Result<(), CliError> {
    let request = config.client.request_for(text, overrides).streaming(false);
    validate_request(&request)?;

    let client = TtsClient::from_config(&config.client)?;
    let path = client.synthesize_to_file(&request, output)?;
    info!("Audio saved to {}", path.display());
    Ok(())
}

pub fn play_file(config: &PlayerConfig, path: &Path) -> Result<PlaybackOutcome, CliError> {
    if !path.is_file() {
        return Err(CliError::InvalidInput(format!("File not found: {}", path.display())));
    }

    let mut pipeline = PlaybackPipeline::with_device(config.pipeline.clone());
    Ok(pipeline.play_file(path)?)
}

pub fn devices() -> Result<Vec<String>, CliError> {
    Ok(list_output_devices()?)
}
