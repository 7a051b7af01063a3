//! Incremental decoding and playback of synthesized speech streams.
//!
//! A synthesis response arrives as byte chunks of arbitrary size. The first
//! chunk may open with a WAV header that fixes the PCM layout for the whole
//! stream; every chunk is then converted to normalized `f32` samples, and
//! the assembled waveform is played in one blocking call.
//!
//! ```no_run
//! use tts_core::{PipelineConfig, PlaybackPipeline};
//!
//! let chunks: Vec<Result<Vec<u8>, std::io::Error>> = Vec::new();
//! let mut pipeline = PlaybackPipeline::with_device(PipelineConfig::from_env());
//! let outcome = pipeline.play_stream(chunks)?;
//! println!("{outcome:?}");
//! # Ok::<(), tts_core::PipelineError>(())
//! ```

mod buffer;
mod config;
mod decode;
mod error;
mod format;
mod pipeline;
pub mod sink;
pub mod stream;
pub mod wav;

pub use buffer::{DecodedBlock, PlaybackBuffer, Waveform};
pub use config::PipelineConfig;
pub use decode::{decode_samples, PartialSamplePolicy, StreamDecoder};
pub use error::{FormatError, PipelineError, SinkError};
pub use format::{AudioFormat, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_SAMPLE_WIDTH};
pub use pipeline::{DecodedStream, PlaybackPipeline};
pub use sink::{AudioSink, DeviceSink, PlaybackOutcome, SkipReason};
pub use stream::ChunkedReader;
