//! Common utilities for client tests

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio::sync::oneshot;
use tts_core::{AudioSink, PlaybackOutcome, SinkError, SkipReason, Waveform};

/// What the mock service answers to every `/tts` request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Audio(Vec<u8>),
    Error {
        status: u16,
        content_type: &'static str,
        body: String,
    },
}

#[derive(Clone)]
struct MockState {
    reply: Arc<MockReply>,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

/// Synthesis service stand-in running on its own runtime thread.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub fn start(reply: MockReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply: Arc::new(reply),
            requests: requests.clone(),
        };
        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let app = Router::new().route("/tts", post(tts_handler)).with_state(state);
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();

                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            base_url: format!("http://{}", addr),
            requests,
            shutdown: Some(shutdown_tx),
        }
    }

    /// JSON bodies received so far, oldest first.
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn tts_handler(
    State(state): State<MockState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.requests.lock().unwrap().push(body);

    match &*state.reply {
        MockReply::Audio(bytes) => {
            ([(header::CONTENT_TYPE, "audio/wav")], bytes.clone()).into_response()
        }
        MockReply::Error {
            status,
            content_type,
            body,
        } => (
            StatusCode::from_u16(*status).unwrap(),
            [(header::CONTENT_TYPE, *content_type)],
            body.clone(),
        )
            .into_response(),
    }
}

/// Sink that keeps every waveform it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<Waveform>,
}

impl AudioSink for RecordingSink {
    fn is_available(&self) -> bool {
        true
    }

    fn play(&mut self, waveform: &Waveform) -> Result<PlaybackOutcome, SinkError> {
        if waveform.is_empty() {
            return Ok(PlaybackOutcome::Skipped(SkipReason::NoAudio));
        }
        self.played.push(waveform.clone());
        Ok(PlaybackOutcome::played(waveform))
    }
}

/// 16-bit WAV file holding `samples`.
pub fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
