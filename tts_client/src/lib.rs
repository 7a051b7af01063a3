//! HTTP client for a GPT-SoVITS style synthesis service.
//!
//! [`TtsClient`] posts a [`SynthesisRequest`] to `{base_url}/tts` and either
//! streams the response body as a [`ChunkStream`] or writes it to a file.
//! [`Speaker`] ties the stream to a `tts_core` playback pipeline.

mod config;
mod error;
mod speak;

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, Response};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tts_core::ChunkedReader;

pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_LANG, DEFAULT_PROMPT_TEXT, DEFAULT_REF_AUDIO_PATH};
pub use error::{SpeakError, TransportError};
pub use speak::{SpeakOverrides, Speaker};

/// Request body for the `/tts` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub text_lang: String,
    pub ref_audio_path: String,
    pub prompt_lang: String,
    pub prompt_text: String,
    pub text_split_method: String,
    pub batch_size: u32,
    pub media_type: String,
    pub streaming_mode: bool,

    // Tuning knobs, sent only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_bucket: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_infer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_sampling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_chunk_length: Option<u32>,
}

impl SynthesisRequest {
    /// Streaming WAV request in Chinese, split with `cut5`.
    pub fn new(
        text: impl Into<String>,
        ref_audio_path: impl Into<String>,
        prompt_text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            text_lang: DEFAULT_LANG.to_string(),
            ref_audio_path: ref_audio_path.into(),
            prompt_lang: DEFAULT_LANG.to_string(),
            prompt_text: prompt_text.into(),
            text_split_method: "cut5".to_string(),
            batch_size: 1,
            media_type: "wav".to_string(),
            streaming_mode: true,
            top_k: None,
            top_p: None,
            temperature: None,
            batch_threshold: None,
            split_bucket: None,
            speed_factor: None,
            fragment_interval: None,
            seed: None,
            parallel_infer: None,
            repetition_penalty: None,
            sample_steps: None,
            super_sampling: None,
            overlap_length: None,
            min_chunk_length: None,
        }
    }

    pub fn with_langs(mut self, text_lang: impl Into<String>, prompt_lang: impl Into<String>) -> Self {
        self.text_lang = text_lang.into();
        self.prompt_lang = prompt_lang.into();
        self
    }

    pub fn streaming(mut self, streaming_mode: bool) -> Self {
        self.streaming_mode = streaming_mode;
        self
    }
}

/// Response body of a streaming synthesis call, read lazily in chunks of
/// at most `chunk_size` bytes. Finite and not restartable.
pub struct ChunkStream {
    inner: ChunkedReader<Response>,
}

impl ChunkStream {
    pub fn chunk_size(&self) -> usize {
        self.inner.chunk_size()
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Vec<u8>, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|chunk| chunk.map_err(TransportError::from))
    }
}

pub struct TtsClient {
    base_url: String,
    endpoint: String,
    chunk_size: usize,
    client: Client,
}

impl TtsClient {
    /// Client for `base_url` with the default chunk size and timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            endpoint: format!("{}/tts", base_url),
            base_url,
            chunk_size: config.chunk_size.max(1),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Start a synthesis and return its body as a chunk stream.
    ///
    /// A non-success status is reported here, before any chunk is read.
    pub fn synthesize_to_stream(&self, request: &SynthesisRequest) -> Result<ChunkStream, TransportError> {
        info!("Streaming synthesis of {} character(s)", request.text.chars().count());
        let response = self.send(request)?;
        Ok(ChunkStream {
            inner: ChunkedReader::new(response, self.chunk_size),
        })
    }

    /// Synthesize in one response and write the body verbatim to `output_path`.
    pub fn synthesize_to_file<P: AsRef<Path>>(
        &self,
        request: &SynthesisRequest,
        output_path: P,
    ) -> Result<PathBuf, TransportError> {
        let output_path = output_path.as_ref();
        info!("Synthesizing {} character(s) to file", request.text.chars().count());

        let body = self.send(request)?.bytes()?;
        fs::write(output_path, &body)?;

        info!("Saved {} byte(s) to {}", body.len(), output_path.display());
        Ok(output_path.to_path_buf())
    }

    fn send(&self, request: &SynthesisRequest) -> Result<Response, TransportError> {
        debug!(
            "POST {} (text_lang={}, streaming_mode={})",
            self.endpoint, request.text_lang, request.streaming_mode
        );

        let response = self.client.post(&self.endpoint).json(request).send()?;
        if !response.status().is_success() {
            let err = status_error(response);
            warn!("{}", err);
            return Err(err);
        }
        Ok(response)
    }
}

/// Build a `Status` error, keeping a JSON body as JSON text and anything
/// else as plain text.
fn status_error(response: Response) -> TransportError {
    let status = response.status().as_u16();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"));

    let body = response.text().unwrap_or_default();
    let message = if is_json {
        serde_json::from_str::<serde_json::Value>(&body)
            .map(|value| value.to_string())
            .unwrap_or(body)
    } else {
        body
    };

    TransportError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = SynthesisRequest::new("你好", "ref.wav", "prompt");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["text"], "你好");
        assert_eq!(json["text_lang"], "zh");
        assert_eq!(json["prompt_lang"], "zh");
        assert_eq!(json["text_split_method"], "cut5");
        assert_eq!(json["batch_size"], 1);
        assert_eq!(json["media_type"], "wav");
        assert_eq!(json["streaming_mode"], true);
    }

    #[test]
    fn test_unset_tuning_fields_are_omitted() {
        let mut request = SynthesisRequest::new("hi", "ref.wav", "prompt").streaming(false);
        request.temperature = Some(0.4);
        request.seed = Some(7);

        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(json["streaming_mode"], false);
        assert_eq!(json["temperature"], 0.4);
        assert_eq!(json["seed"], 7);
        for key in ["top_k", "top_p", "speed_factor", "fragment_interval", "min_chunk_length"] {
            assert!(!object.contains_key(key), "{key} should be omitted");
        }
    }

    #[test]
    fn test_request_round_trips_without_optionals() {
        let json = r#"{
            "text": "hello", "text_lang": "en", "ref_audio_path": "a.wav",
            "prompt_lang": "en", "prompt_text": "p", "text_split_method": "cut5",
            "batch_size": 1, "media_type": "wav", "streaming_mode": true
        }"#;
        let request: SynthesisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, SynthesisRequest::new("hello", "a.wav", "p").with_langs("en", "en"));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = TtsClient::new("http://127.0.0.1:9880/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9880");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9880/tts");
    }
}
