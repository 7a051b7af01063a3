//! Blocking playback through cpal.

use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    Device, FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig,
    SupportedStreamConfigRange,
};
use tracing::{debug, error, info, warn};

use super::resample::resample;
use super::FrameFeeder;
use crate::buffer::Waveform;
use crate::error::SinkError;

/// Margin on top of the last device buffer before the stream is dropped.
const DRAIN_MARGIN: Duration = Duration::from_millis(50);

enum StreamEvent {
    /// Every frame was handed to the device; the last buffer held this many frames.
    Drained { last_buffer_frames: usize },
    Failed(String),
}

pub(super) fn open_device(device_name: Option<&str>) -> Result<(Device, String), SinkError> {
    let host = cpal::default_host();

    if let Some(name) = device_name {
        let mut devices = host
            .output_devices()
            .map_err(|e| SinkError::DeviceUnavailable(format!("Failed to enumerate devices: {}", e)))?;

        if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
            info!("Found requested audio device: {}", name);
            return Ok((device, name.to_string()));
        }
        warn!("Requested device '{}' not found, falling back to default device", name);
    }

    let device = host
        .default_output_device()
        .ok_or_else(|| SinkError::DeviceUnavailable("No default output device found".to_string()))?;
    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    info!("Using audio device: {}", name);
    Ok((device, name))
}

pub(super) fn list_devices() -> Result<Vec<String>, SinkError> {
    let host = cpal::default_host();
    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| SinkError::DeviceUnavailable(format!("Failed to enumerate devices: {}", e)))?
        .filter_map(|device| device.name().ok())
        .collect();

    debug!("Found {} output devices", devices.len());
    Ok(devices)
}

fn is_playable_format(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16)
}

/// Pick an output configuration at the waveform's rate, preferring its
/// channel count and f32 samples. When no range covers the rate, the
/// device's default configuration is used and the caller resamples.
fn choose_config(
    device: &Device,
    channels: u16,
    sample_rate: u32,
) -> Result<(StreamConfig, SampleFormat), SinkError> {
    let unsupported = |reason: String| SinkError::UnsupportedConfig {
        channels,
        sample_rate,
        reason,
    };

    let rate = SampleRate(sample_rate);
    let best = device
        .supported_output_configs()
        .map_err(|e| unsupported(format!("Failed to get device configs: {}", e)))?
        .filter(|range: &SupportedStreamConfigRange| {
            range.min_sample_rate() <= rate
                && range.max_sample_rate() >= rate
                && is_playable_format(range.sample_format())
        })
        .max_by_key(|range| {
            (
                range.channels() == channels,
                range.sample_format() == SampleFormat::F32,
            )
        });

    if let Some(range) = best {
        let supported = range.with_sample_rate(rate);
        return Ok((supported.config(), supported.sample_format()));
    }

    let fallback = device
        .default_output_config()
        .map_err(|e| unsupported(format!("Failed to get default config: {}", e)))?;
    if !is_playable_format(fallback.sample_format()) {
        return Err(unsupported(format!(
            "no configuration at this sample rate and default format {:?} is not supported",
            fallback.sample_format()
        )));
    }
    info!(
        "Device has no {} Hz configuration, using default {} Hz",
        sample_rate,
        fallback.sample_rate().0
    );
    Ok((fallback.config(), fallback.sample_format()))
}

/// Play `waveform` and block until its last frame has left the device.
pub(super) fn play_blocking(
    device: &Device,
    waveform: &Waveform,
    timeout_slack: Duration,
) -> Result<(), SinkError> {
    let (config, sample_format) = choose_config(device, waveform.channels(), waveform.sample_rate())?;
    debug!(
        "Audio config: sample_rate={}, channels={}, format={:?}",
        config.sample_rate.0, config.channels, sample_format
    );

    let resampled;
    let waveform = if config.sample_rate.0 != waveform.sample_rate() {
        resampled = resample(waveform, config.sample_rate.0)?;
        &resampled
    } else {
        waveform
    };

    let feeder = FrameFeeder::new(waveform, config.channels);
    let (events, done) = mpsc::sync_channel(2);

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(device, &config, feeder, events)?,
        SampleFormat::I16 => build_stream::<i16>(device, &config, feeder, events)?,
        SampleFormat::U16 => build_stream::<u16>(device, &config, feeder, events)?,
        other => {
            return Err(SinkError::UnsupportedConfig {
                channels: waveform.channels(),
                sample_rate: waveform.sample_rate(),
                reason: format!("Unsupported sample format: {:?}", other),
            })
        }
    };

    stream
        .play()
        .map_err(|e| SinkError::Stream(format!("Failed to start stream: {}", e)))?;

    let timeout = waveform.duration() + timeout_slack;
    let result = match done.recv_timeout(timeout) {
        Ok(StreamEvent::Drained { last_buffer_frames }) => {
            // The last buffer was filled, not yet heard.
            let tail = Duration::from_secs_f64(last_buffer_frames as f64 / config.sample_rate.0 as f64);
            thread::sleep(tail + DRAIN_MARGIN);
            Ok(())
        }
        Ok(StreamEvent::Failed(msg)) => Err(SinkError::Stream(msg)),
        Err(RecvTimeoutError::Timeout) => Err(SinkError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(SinkError::Stream(
            "audio stream closed before playback finished".to_string(),
        )),
    };

    if let Err(e) = stream.pause() {
        debug!("Failed to pause stream after playback: {}", e);
    }
    drop(stream);
    result
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut feeder: FrameFeeder,
    events: SyncSender<StreamEvent>,
) -> Result<Stream, SinkError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let error_events = events.clone();
    let mut drained = false;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let finished = feeder.fill(data, T::EQUILIBRIUM, |s| T::from_sample(s));
                if finished && !drained {
                    drained = true;
                    let _ = events.try_send(StreamEvent::Drained {
                        last_buffer_frames: data.len() / channels,
                    });
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
                let _ = error_events.try_send(StreamEvent::Failed(err.to_string()));
            },
            None,
        )
        .map_err(|e| SinkError::Stream(format!("Failed to build stream: {}", e)))
}
