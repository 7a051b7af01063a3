// Configuration for the decode-and-play pipeline

use std::time::Duration;

use crate::decode::PartialSamplePolicy;
use crate::format::{AudioFormat, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_SAMPLE_WIDTH};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Format assumed when the first chunk has no WAV header.
    pub fallback_format: AudioFormat,
    pub partial_samples: PartialSamplePolicy,
    /// Play what was decoded before a transport failure instead of discarding it.
    pub play_partial_on_transport_error: bool,
    /// Output device name; `None` selects the host default.
    pub output_device: Option<String>,
    /// Extra wait past the waveform's duration before playback counts as stuck.
    pub playback_timeout_slack_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fallback_format: AudioFormat::default(),
            partial_samples: PartialSamplePolicy::Carry,
            play_partial_on_transport_error: false,
            output_device: None,
            playback_timeout_slack_secs: 5,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let channels = env_parse("TTS_FALLBACK_CHANNELS").unwrap_or(DEFAULT_CHANNELS);
        let sample_width = env_parse("TTS_FALLBACK_SAMPLE_WIDTH").unwrap_or(DEFAULT_SAMPLE_WIDTH);
        let sample_rate = env_parse("TTS_FALLBACK_SAMPLE_RATE").unwrap_or(DEFAULT_SAMPLE_RATE);

        let partial_samples = match env_flag("TTS_CARRY_PARTIAL_SAMPLES") {
            Some(false) => PartialSamplePolicy::Drop,
            _ => PartialSamplePolicy::Carry,
        };

        let play_partial_on_transport_error =
            env_flag("TTS_PLAY_PARTIAL_ON_ERROR").unwrap_or(false);

        let output_device = std::env::var("TTS_OUTPUT_DEVICE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let playback_timeout_slack_secs = env_parse("TTS_PLAYBACK_TIMEOUT_SLACK_SECS").unwrap_or(5);

        Self {
            fallback_format: AudioFormat::new(channels.max(1), sample_width, sample_rate.max(1)),
            partial_samples,
            play_partial_on_transport_error,
            output_device,
            playback_timeout_slack_secs,
        }
    }

    pub fn playback_timeout_slack(&self) -> Duration {
        Duration::from_secs(self.playback_timeout_slack_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}
