// Configuration for the command-line player

use tts_client::ClientConfig;
use tts_core::PipelineConfig;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub client: ClientConfig,
    pub pipeline: PipelineConfig,
    /// Log filter from `TTS_LOG`; `RUST_LOG` takes precedence when set.
    pub log_filter: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            pipeline: PipelineConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn from_env() -> Self {
        let log_filter = std::env::var("TTS_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            client: ClientConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
            log_filter,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url {
            self.client.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_device(mut self, device: Option<&str>) -> Self {
        if let Some(name) = device {
            self.pipeline.output_device = Some(name.to_string());
        }
        self
    }
}
