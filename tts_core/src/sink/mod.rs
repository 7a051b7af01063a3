//! Audio sinks.
//!
//! A sink receives one fully assembled [`Waveform`] at a time and blocks
//! until the device has played it. [`DeviceSink`] decides once, when it is
//! opened, whether an output device exists; without one every playback is
//! a logged no-op rather than an error.

#[cfg(feature = "device")]
mod cpal_output;
#[cfg(feature = "device")]
mod resample;

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::buffer::Waveform;
use crate::error::SinkError;

/// Why a playback call produced no sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The stream decoded to zero samples.
    NoAudio,
    /// No output device was available when the sink was opened.
    DeviceUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    Played {
        frames: usize,
        channels: u16,
        sample_rate: u32,
        duration: Duration,
    },
    Skipped(SkipReason),
}

impl PlaybackOutcome {
    pub fn played(waveform: &Waveform) -> Self {
        PlaybackOutcome::Played {
            frames: waveform.frame_count(),
            channels: waveform.channels(),
            sample_rate: waveform.sample_rate(),
            duration: waveform.duration(),
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self, PlaybackOutcome::Played { .. })
    }
}

/// Destination for assembled waveforms.
///
/// `play` takes `&mut self`: one caller cannot start a second playback on
/// the same sink before the first has returned.
pub trait AudioSink {
    fn is_available(&self) -> bool;

    /// Play `waveform` and return once the device has finished with it.
    fn play(&mut self, waveform: &Waveform) -> Result<PlaybackOutcome, SinkError>;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn play(&mut self, waveform: &Waveform) -> Result<PlaybackOutcome, SinkError> {
        (**self).play(waveform)
    }
}

enum DeviceState {
    #[cfg(feature = "device")]
    Ready {
        device: cpal::Device,
        name: String,
    },
    Unavailable(String),
}

/// Sink backed by the system's audio output.
pub struct DeviceSink {
    state: DeviceState,
    timeout_slack: Duration,
}

// Manual Debug implementation since cpal::Device doesn't implement Debug
impl fmt::Debug for DeviceSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSink")
            .field("device", &self.device_name())
            .field("unavailable", &self.unavailable_reason())
            .field("timeout_slack", &self.timeout_slack)
            .finish()
    }
}

impl DeviceSink {
    /// Open the named output device, or the default one when `device_name` is
    /// `None` or not found. Never fails: a missing device is recorded and
    /// turns every later `play` into a no-op.
    pub fn open(device_name: Option<&str>) -> Self {
        #[cfg(feature = "device")]
        let state = match cpal_output::open_device(device_name) {
            Ok((device, name)) => DeviceState::Ready { device, name },
            Err(e) => {
                warn!("Audio playback disabled: {}", e);
                DeviceState::Unavailable(e.to_string())
            }
        };

        #[cfg(not(feature = "device"))]
        let state = {
            let _ = device_name;
            warn!("Audio playback disabled: built without device support");
            DeviceState::Unavailable("built without device support".to_string())
        };

        Self {
            state,
            timeout_slack: Duration::from_secs(5),
        }
    }

    /// A sink that never plays.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: DeviceState::Unavailable(reason.into()),
            timeout_slack: Duration::from_secs(5),
        }
    }

    pub fn with_timeout_slack(mut self, slack: Duration) -> Self {
        self.timeout_slack = slack;
        self
    }

    pub fn device_name(&self) -> Option<&str> {
        match &self.state {
            #[cfg(feature = "device")]
            DeviceState::Ready { name, .. } => Some(name),
            DeviceState::Unavailable(_) => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            #[cfg(feature = "device")]
            DeviceState::Ready { .. } => None,
            DeviceState::Unavailable(reason) => Some(reason),
        }
    }
}

impl AudioSink for DeviceSink {
    fn is_available(&self) -> bool {
        self.unavailable_reason().is_none()
    }

    fn play(&mut self, waveform: &Waveform) -> Result<PlaybackOutcome, SinkError> {
        match &self.state {
            #[cfg(feature = "device")]
            DeviceState::Ready { device, name } => {
                info!(
                    "Playing {} frame(s) ({} channel(s) at {} Hz) on {}",
                    waveform.frame_count(),
                    waveform.channels(),
                    waveform.sample_rate(),
                    name
                );
                cpal_output::play_blocking(device, waveform, self.timeout_slack)?;
                info!("Playback finished");
                Ok(PlaybackOutcome::played(waveform))
            }
            DeviceState::Unavailable(reason) => {
                warn!(
                    "Audio playback unavailable ({}), skipping {} frame(s)",
                    reason,
                    waveform.frame_count()
                );
                Ok(PlaybackOutcome::Skipped(SkipReason::DeviceUnavailable))
            }
        }
    }
}

/// Names of the host's output devices. Empty without device support.
pub fn list_output_devices() -> Result<Vec<String>, SinkError> {
    #[cfg(feature = "device")]
    return cpal_output::list_devices();

    #[cfg(not(feature = "device"))]
    Ok(Vec::new())
}

/// Feeds device buffers from an interleaved waveform, mapping its channel
/// count onto the device's. Output channel `c` takes source channel
/// `c % source_channels`, so mono is duplicated to every speaker.
#[cfg_attr(not(feature = "device"), allow(dead_code))]
struct FrameFeeder {
    samples: Vec<f32>,
    source_channels: usize,
    output_channels: usize,
    frame_count: usize,
    next_frame: usize,
}

#[cfg_attr(not(feature = "device"), allow(dead_code))]
impl FrameFeeder {
    fn new(waveform: &Waveform, output_channels: u16) -> Self {
        Self {
            samples: waveform.to_interleaved(),
            source_channels: waveform.channels().max(1) as usize,
            output_channels: output_channels.max(1) as usize,
            frame_count: waveform.frame_count(),
            next_frame: 0,
        }
    }

    fn is_finished(&self) -> bool {
        self.next_frame >= self.frame_count
    }

    /// Fill `out` with the next frames, padding with `silence` past the end.
    /// Returns true once every frame has been handed out.
    fn fill<T: Copy>(&mut self, out: &mut [T], silence: T, convert: impl Fn(f32) -> T) -> bool {
        for frame in out.chunks_mut(self.output_channels) {
            if self.is_finished() {
                frame.fill(silence);
                continue;
            }

            let base = self.next_frame * self.source_channels;
            for (c, slot) in frame.iter_mut().enumerate() {
                let sample = self.samples[base + c % self.source_channels];
                *slot = convert(sample.clamp(-1.0, 1.0));
            }
            self.next_frame += 1;
        }
        self.is_finished()
    }
}
