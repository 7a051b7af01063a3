//! Common utilities for pipeline tests

#![allow(dead_code)]

use std::io::{self, Cursor};

use tts_core::{AudioSink, PlaybackOutcome, SinkError, SkipReason, Waveform};

/// Sink that keeps every waveform it is asked to play.
#[derive(Debug)]
pub struct RecordingSink {
    pub available: bool,
    pub played: Vec<Waveform>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            available: true,
            played: Vec::new(),
        }
    }

    pub fn missing_device() -> Self {
        Self {
            available: false,
            played: Vec::new(),
        }
    }
}

impl AudioSink for RecordingSink {
    fn is_available(&self) -> bool {
        self.available
    }

    fn play(&mut self, waveform: &Waveform) -> Result<PlaybackOutcome, SinkError> {
        if !self.available {
            return Ok(PlaybackOutcome::Skipped(SkipReason::DeviceUnavailable));
        }
        self.played.push(waveform.clone());
        Ok(PlaybackOutcome::played(waveform))
    }
}

/// Encode integer samples as a complete in-memory WAV file.
pub fn wav_bytes(channels: u16, bits_per_sample: u16, sample_rate: u32, samples: &[i32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            match bits_per_sample {
                8 => writer.write_sample(s as i8).unwrap(),
                16 => writer.write_sample(s as i16).unwrap(),
                _ => writer.write_sample(s).unwrap(),
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn pcm16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Split `bytes` into transport chunks of `size` bytes.
pub fn chunked(bytes: &[u8], size: usize) -> Vec<io::Result<Vec<u8>>> {
    bytes.chunks(size).map(|c| Ok(c.to_vec())).collect()
}

pub fn ok_chunks(chunks: Vec<Vec<u8>>) -> Vec<io::Result<Vec<u8>>> {
    chunks.into_iter().map(Ok).collect()
}

pub fn assert_samples_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-6, "sample {i}: {a} != {e}");
    }
}
