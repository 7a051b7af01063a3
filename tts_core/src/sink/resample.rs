//! Sample-rate conversion for devices that cannot run at the stream's rate.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::buffer::Waveform;
use crate::error::SinkError;

/// Convert `waveform` to `target_rate`, keeping its channel layout.
///
/// The whole waveform is processed as a single chunk.
pub(super) fn resample(waveform: &Waveform, target_rate: u32) -> Result<Waveform, SinkError> {
    let source_rate = waveform.sample_rate();
    let channels = waveform.channels();
    let frames = waveform.frame_count();

    if source_rate == target_rate || frames == 0 {
        return Ok(Waveform::from_interleaved(
            waveform.to_interleaved(),
            channels,
            target_rate,
        ));
    }

    let failed = |reason: String| SinkError::Resample {
        from: source_rate,
        to: target_rate,
        reason,
    };

    let mut resampler = FastFixedIn::<f32>::new(
        target_rate as f64 / source_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        frames,
        channels as usize,
    )
    .map_err(|e| failed(format!("Failed to create resampler: {}", e)))?;

    let planar_input = deinterleave(&waveform.to_interleaved(), channels as usize);
    let planar_output = resampler
        .process(&planar_input, None)
        .map_err(|e| failed(e.to_string()))?;

    let resampled = Waveform::from_interleaved(interleave(planar_output), channels, target_rate);
    debug!(
        "Resampled {} frames at {} Hz to {} frames at {} Hz",
        frames,
        source_rate,
        resampled.frame_count(),
        target_rate
    );
    Ok(resampled)
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let channels = channels.max(1);
    let mut planar = vec![Vec::with_capacity(samples.len() / channels); channels];
    for frame in samples.chunks_exact(channels) {
        for (lane, &sample) in planar.iter_mut().zip(frame) {
            lane.push(sample);
        }
    }
    planar
}

fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
    let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        for lane in &planar {
            interleaved.push(lane[i]);
        }
    }
    interleaved
}
