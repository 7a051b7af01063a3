//! Integer PCM to normalized `f32` conversion.
//!
//! Every supported width is brought to 16-bit dynamic range first and then
//! divided by 32768, so 8-bit and 32-bit sources play at the same scale as
//! 16-bit ones. 32-bit input loses its low 16 bits.

use tracing::{debug, trace};

use crate::error::FormatError;

const I16_SCALE: f32 = 32768.0;
const U8_BIAS: i16 = 128;

/// What happens to bytes at the end of a chunk that do not form a whole sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialSamplePolicy {
    /// Keep them and prepend them to the next chunk.
    #[default]
    Carry,
    /// Discard them; the next chunk starts on a fresh sample boundary.
    Drop,
}

/// Decode little-endian integer PCM into samples in `[-1.0, 1.0]`.
///
/// Trailing bytes that do not complete a sample are ignored. Empty input
/// always yields an empty block, whatever the width.
pub fn decode_samples(bytes: &[u8], sample_width: u16) -> Result<Vec<f32>, FormatError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let samples = match sample_width {
        1 => bytes
            .iter()
            .map(|&b| ((b as i16 - U8_BIAS) * 256) as f32 / I16_SCALE)
            .collect(),
        2 => bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / I16_SCALE)
            .collect(),
        4 => bytes
            .chunks_exact(4)
            .map(|b| {
                let wide = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                (wide >> 16) as i16 as f32 / I16_SCALE
            })
            .collect(),
        other => return Err(FormatError::UnsupportedSampleWidth(other)),
    };

    Ok(samples)
}

/// Stateful decoder for one stream.
///
/// Chunk boundaries come from the transport and may split a sample. Under
/// [`PartialSamplePolicy::Carry`] the split bytes wait for the next chunk;
/// under [`PartialSamplePolicy::Drop`] they are counted and discarded.
#[derive(Debug)]
pub struct StreamDecoder {
    sample_width: u16,
    policy: PartialSamplePolicy,
    pending: Vec<u8>,
    dropped_bytes: usize,
}

impl StreamDecoder {
    pub fn new(sample_width: u16, policy: PartialSamplePolicy) -> Self {
        Self {
            sample_width,
            policy,
            pending: Vec::new(),
            dropped_bytes: 0,
        }
    }

    pub fn sample_width(&self) -> u16 {
        self.sample_width
    }

    /// Decode the next chunk of the stream.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<f32>, FormatError> {
        let width = self.sample_width as usize;
        if !matches!(width, 1 | 2 | 4) {
            return if chunk.is_empty() && self.pending.is_empty() {
                Ok(Vec::new())
            } else {
                Err(FormatError::UnsupportedSampleWidth(self.sample_width))
            };
        }

        match self.policy {
            PartialSamplePolicy::Drop => {
                let tail = chunk.len() % width;
                if tail != 0 {
                    trace!("Dropping {} trailing byte(s) of a split sample", tail);
                    self.dropped_bytes += tail;
                }
                decode_samples(chunk, self.sample_width)
            }
            PartialSamplePolicy::Carry => {
                if self.pending.is_empty() {
                    let whole = chunk.len() - chunk.len() % width;
                    self.pending.extend_from_slice(&chunk[whole..]);
                    return decode_samples(&chunk[..whole], self.sample_width);
                }

                self.pending.extend_from_slice(chunk);
                let whole = self.pending.len() - self.pending.len() % width;
                let samples = decode_samples(&self.pending[..whole], self.sample_width)?;
                self.pending.drain(..whole);
                Ok(samples)
            }
        }
    }

    /// Close the stream and return how many bytes never became samples.
    pub fn finish(mut self) -> usize {
        self.dropped_bytes += self.pending.len();
        self.pending.clear();
        if self.dropped_bytes > 0 {
            debug!(
                "{} byte(s) did not form whole samples and were discarded",
                self.dropped_bytes
            );
        }
        self.dropped_bytes
    }
}
