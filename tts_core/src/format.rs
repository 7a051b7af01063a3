//! PCM stream parameters.

use std::fmt;

/// Channel count used when the first chunk carries no container header.
pub const DEFAULT_CHANNELS: u16 = 1;
/// Sample width (bytes) used when the first chunk carries no container header.
pub const DEFAULT_SAMPLE_WIDTH: u16 = 2;
/// Sample rate used when the first chunk carries no container header.
/// Matches the synthesis service's usual output.
pub const DEFAULT_SAMPLE_RATE: u32 = 32_000;

/// Layout of the PCM payload of one stream.
///
/// Determined once from the first chunk and fixed for the rest of the
/// stream. `sample_width` is not validated here: widths other than 1, 2
/// or 4 bytes are rejected by the decoder, not by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_width: u16,
    pub sample_rate: u32,
}

impl AudioFormat {
    pub fn new(channels: u16, sample_width: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_width,
            sample_rate,
        }
    }

    /// Bytes per frame (one sample for every channel).
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNELS, DEFAULT_SAMPLE_WIDTH, DEFAULT_SAMPLE_RATE)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channels={}, sample_width={}, sample_rate={}",
            self.channels, self.sample_width, self.sample_rate
        )
    }
}
