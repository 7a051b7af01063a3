//! Accumulation of decoded blocks into one playable waveform.

use std::time::Duration;

use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, warn};

/// Samples decoded from one chunk, interleaved by frame.
pub type DecodedBlock = Array1<f32>;

/// Complete audio of one request, shaped `(frame_count, channel_count)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    frames: Array2<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Build from interleaved samples. A trailing incomplete frame is dropped.
    pub fn from_interleaved(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self::from_flat(ArrayView1::from(samples.as_slice()), channels, sample_rate)
    }

    fn from_flat(flat: ArrayView1<'_, f32>, channels: u16, sample_rate: u32) -> Self {
        let width = channels.max(1) as usize;
        let frame_count = flat.len() / width;
        let leftover = flat.len() % width;
        if leftover != 0 {
            warn!(
                "Trimming {} sample(s) that do not complete a {}-channel frame",
                leftover, width
            );
        }

        let frames = Array2::from_shape_fn((frame_count, width), |(f, c)| flat[f * width + c]);
        Self {
            frames,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.frames.ncols() as u16
    }

    pub fn frame_count(&self) -> usize {
        self.frames.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_mono(&self) -> bool {
        self.frames.ncols() == 1
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// The `(frame_count, channel_count)` view.
    pub fn frames(&self) -> ArrayView2<'_, f32> {
        self.frames.view()
    }

    /// Flat sample sequence for device APIs: the single channel for mono,
    /// frame-interleaved otherwise.
    pub fn to_interleaved(&self) -> Vec<f32> {
        self.frames.iter().copied().collect()
    }
}

/// Ordered collection of decoded blocks for one stream.
///
/// Blocks are kept in arrival order; empty blocks are not stored.
#[derive(Debug, Default)]
pub struct PlaybackBuffer {
    blocks: Vec<DecodedBlock>,
    sample_count: usize,
}

impl PlaybackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, samples: Vec<f32>) {
        if samples.is_empty() {
            return;
        }
        self.sample_count += samples.len();
        self.blocks.push(DecodedBlock::from(samples));
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Concatenate every block along the time axis.
    ///
    /// Returns `None` when nothing was decoded.
    pub fn into_waveform(self, channels: u16, sample_rate: u32) -> Option<Waveform> {
        if self.blocks.is_empty() {
            return None;
        }

        let views: Vec<ArrayView1<'_, f32>> = self.blocks.iter().map(|b| b.view()).collect();
        let joined = concatenate(Axis(0), &views).ok()?;
        debug!(
            "Assembled {} block(s) into {} sample(s)",
            self.blocks.len(),
            joined.len()
        );

        Some(Waveform::from_flat(joined.view(), channels, sample_rate))
    }
}
