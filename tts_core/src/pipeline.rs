//! Decode-then-play pipeline for one synthesized stream.
//!
//! The chunk source is drained completely before the sink is called: the
//! first non-empty chunk is sniffed for a WAV header, every chunk is
//! decoded in arrival order, and the assembled waveform is played in one
//! blocking call. Nothing is shared between calls.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::buffer::{PlaybackBuffer, Waveform};
use crate::config::PipelineConfig;
use crate::decode::{PartialSamplePolicy, StreamDecoder};
use crate::error::{FormatError, PipelineError};
use crate::format::AudioFormat;
use crate::sink::{AudioSink, DeviceSink, PlaybackOutcome, SkipReason};
use crate::wav::{self, Container};

/// Result of draining and decoding a chunk source.
#[derive(Debug)]
pub struct DecodedStream {
    /// `None` when no non-empty chunk arrived.
    pub format: Option<AudioFormat>,
    pub container: Option<Container>,
    /// `None` when nothing decoded to audio.
    pub waveform: Option<Waveform>,
    pub chunks: usize,
    /// Bytes that never formed a whole sample.
    pub dropped_bytes: usize,
}

/// Per-stream decode state. Lives for one pass over a chunk source.
struct StreamSession {
    fallback: AudioFormat,
    policy: PartialSamplePolicy,
    decoder: Option<StreamDecoder>,
    format: Option<AudioFormat>,
    container: Option<Container>,
    buffer: PlaybackBuffer,
    chunks: usize,
}

impl StreamSession {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            fallback: config.fallback_format,
            policy: config.partial_samples,
            decoder: None,
            format: None,
            container: None,
            buffer: PlaybackBuffer::new(),
            chunks: 0,
        }
    }

    fn feed(&mut self, chunk: &[u8]) -> Result<(), FormatError> {
        self.chunks += 1;

        if let Some(decoder) = self.decoder.as_mut() {
            let samples = decoder.push(chunk)?;
            self.buffer.push(samples);
            return Ok(());
        }

        // Empty frames before the first real chunk do not consume the sniff.
        if chunk.is_empty() {
            return Ok(());
        }

        let sniffed = wav::sniff(chunk, self.fallback);
        info!("Stream format: {} ({:?})", sniffed.format, sniffed.container);
        self.format = Some(sniffed.format);
        self.container = Some(sniffed.container);

        let decoder = self
            .decoder
            .insert(StreamDecoder::new(sniffed.format.sample_width, self.policy));
        let samples = decoder.push(sniffed.payload(chunk))?;
        self.buffer.push(samples);
        Ok(())
    }

    fn finish(self) -> DecodedStream {
        let dropped_bytes = self.decoder.map(StreamDecoder::finish).unwrap_or(0);
        let waveform = self
            .format
            .and_then(|f| self.buffer.into_waveform(f.channels, f.sample_rate));

        DecodedStream {
            format: self.format,
            container: self.container,
            waveform,
            chunks: self.chunks,
            dropped_bytes,
        }
    }
}

pub struct PlaybackPipeline<S> {
    config: PipelineConfig,
    sink: S,
}

impl PlaybackPipeline<DeviceSink> {
    /// Pipeline playing through the configured (or default) output device.
    pub fn with_device(config: PipelineConfig) -> Self {
        let sink = DeviceSink::open(config.output_device.as_deref())
            .with_timeout_slack(config.playback_timeout_slack());
        Self::new(config, sink)
    }
}

impl<S: AudioSink> PlaybackPipeline<S> {
    pub fn new(config: PipelineConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Drain `chunks` and decode them without playing anything.
    pub fn decode_stream<I, B, E>(&self, chunks: I) -> Result<DecodedStream, PipelineError>
    where
        I: IntoIterator<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        match self.drain(chunks)? {
            (decoded, None) => Ok(decoded),
            (_, Some(err)) => Err(err),
        }
    }

    /// Drain `chunks`, decode them and play the result.
    ///
    /// A transport failure skips playback and returns the error, unless
    /// `play_partial_on_transport_error` is set and some audio was already
    /// decoded; that audio is then played before the error is returned.
    pub fn play_stream<I, B, E>(&mut self, chunks: I) -> Result<PlaybackOutcome, PipelineError>
    where
        I: IntoIterator<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let (decoded, transport_error) = self.drain(chunks)?;

        if let Some(err) = transport_error {
            match decoded.waveform {
                Some(waveform) if self.config.play_partial_on_transport_error => {
                    warn!(
                        "Stream failed after {} chunk(s), playing the {} decoded frame(s): {}",
                        decoded.chunks,
                        waveform.frame_count(),
                        err
                    );
                    self.play_waveform(Some(waveform))?;
                }
                _ => warn!(
                    "Stream failed after {} chunk(s), skipping playback: {}",
                    decoded.chunks, err
                ),
            }
            return Err(err);
        }

        self.play_waveform(decoded.waveform)
    }

    /// Hand a waveform to the sink. `None` or an empty waveform is a no-op.
    pub fn play_waveform(&mut self, waveform: Option<Waveform>) -> Result<PlaybackOutcome, PipelineError> {
        let Some(waveform) = waveform.filter(|w| !w.is_empty()) else {
            info!("No audio data to play");
            return Ok(PlaybackOutcome::Skipped(SkipReason::NoAudio));
        };

        debug!(
            "Playing {} sample(s) at {} Hz",
            waveform.frame_count() * waveform.channels() as usize,
            waveform.sample_rate()
        );
        Ok(self.sink.play(&waveform)?)
    }

    /// Play a complete WAV file from disk.
    pub fn play_file<P: AsRef<Path>>(&mut self, path: P) -> Result<PlaybackOutcome, PipelineError> {
        let path = path.as_ref();
        if !self.sink.is_available() {
            warn!("Audio playback unavailable, not playing {}", path.display());
            return Ok(PlaybackOutcome::Skipped(SkipReason::DeviceUnavailable));
        }

        let waveform = wav::load_wav_file(path)?;
        info!(
            "Playing file {}: sample_rate={}, frames={}",
            path.display(),
            waveform.sample_rate(),
            waveform.frame_count()
        );
        self.play_waveform(Some(waveform))
    }

    /// Consume the whole source. Format errors abort immediately; a transport
    /// error ends the pass and is returned next to what was decoded so far.
    fn drain<I, B, E>(&self, chunks: I) -> Result<(DecodedStream, Option<PipelineError>), PipelineError>
    where
        I: IntoIterator<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let mut session = StreamSession::new(&self.config);
        let mut transport_error = None;

        for item in chunks {
            match item {
                Ok(chunk) => session.feed(chunk.as_ref())?,
                Err(e) => {
                    transport_error = Some(PipelineError::transport(e));
                    break;
                }
            }
        }

        let decoded = session.finish();
        debug!(
            "Drained {} chunk(s), {} frame(s) decoded",
            decoded.chunks,
            decoded.waveform.as_ref().map_or(0, Waveform::frame_count)
        );
        Ok((decoded, transport_error))
    }
}
