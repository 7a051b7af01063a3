// Connection and voice defaults for the synthesis service

use std::time::Duration;

use tts_core::stream::DEFAULT_CHUNK_SIZE;

use crate::speak::SpeakOverrides;
use crate::SynthesisRequest;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9880";
pub const DEFAULT_REF_AUDIO_PATH: &str = "data/fairy_01_疑问.wav";
pub const DEFAULT_PROMPT_TEXT: &str =
    "替小师傅们买水，连续三次中了再来一瓶，这难道就是《天虚问道录》里所谓的气运之子的机缘？";
pub const DEFAULT_LANG: &str = "zh";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on the size of each streamed chunk, in bytes.
    pub chunk_size: usize,
    pub ref_audio_path: String,
    pub prompt_text: String,
    pub text_lang: String,
    pub prompt_lang: String,
    pub temperature: f64,
    pub fragment_interval: f64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            ref_audio_path: DEFAULT_REF_AUDIO_PATH.to_string(),
            prompt_text: DEFAULT_PROMPT_TEXT.to_string(),
            text_lang: DEFAULT_LANG.to_string(),
            prompt_lang: DEFAULT_LANG.to_string(),
            temperature: 0.4,
            fragment_interval: 0.45,
            request_timeout_secs: 120,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("TTS_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let chunk_size = std::env::var("TTS_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&size: &usize| size > 0)
            .unwrap_or(defaults.chunk_size);

        let ref_audio_path = std::env::var("TTS_REF_AUDIO_PATH").unwrap_or(defaults.ref_audio_path);
        let prompt_text = std::env::var("TTS_PROMPT_TEXT").unwrap_or(defaults.prompt_text);
        let text_lang = std::env::var("TTS_TEXT_LANG").unwrap_or(defaults.text_lang);
        let prompt_lang = std::env::var("TTS_PROMPT_LANG").unwrap_or(defaults.prompt_lang);

        let temperature = std::env::var("TTS_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);

        let fragment_interval = std::env::var("TTS_FRAGMENT_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.fragment_interval);

        let request_timeout_secs = std::env::var("TTS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        Self {
            base_url,
            chunk_size,
            ref_audio_path,
            prompt_text,
            text_lang,
            prompt_lang,
            temperature,
            fragment_interval,
            request_timeout_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Streaming request for `text` using these defaults, with `overrides` on top.
    pub fn request_for(&self, text: &str, overrides: &SpeakOverrides) -> SynthesisRequest {
        let pick = |value: &Option<String>, default: &str| value.clone().unwrap_or_else(|| default.to_string());

        let mut request = SynthesisRequest::new(
            text,
            pick(&overrides.ref_audio_path, &self.ref_audio_path),
            pick(&overrides.prompt_text, &self.prompt_text),
        )
        .with_langs(
            pick(&overrides.text_lang, &self.text_lang),
            pick(&overrides.prompt_lang, &self.prompt_lang),
        )
        .streaming(true);

        request.temperature = Some(overrides.temperature.unwrap_or(self.temperature));
        request.fragment_interval = Some(overrides.fragment_interval.unwrap_or(self.fragment_interval));
        request.speed_factor = overrides.speed_factor;
        request.seed = overrides.seed;
        request.top_k = overrides.top_k;
        request.top_p = overrides.top_p;
        request
    }
}
