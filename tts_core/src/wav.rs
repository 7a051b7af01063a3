//! RIFF/WAVE header detection and WAV file loading.
//!
//! Streaming synthesis responses usually start with a canonical 44-byte
//! WAVE header, but the header may be missing, truncated, or split from the
//! first PCM bytes by the transport. [`sniff`] inspects only the first chunk
//! of a stream and never fails: anything it cannot make sense of degrades to
//! "the whole chunk is PCM in the fallback format".

use std::path::Path;

use tracing::{debug, warn};

use crate::buffer::Waveform;
use crate::error::PipelineError;
use crate::format::AudioFormat;

pub const RIFF_ID: &[u8; 4] = b"RIFF";
pub const WAVE_ID: &[u8; 4] = b"WAVE";
pub const FMT_ID: &[u8; 4] = b"fmt ";
pub const DATA_ID: &[u8; 4] = b"data";

/// "RIFF" + size + "WAVE"
const RIFF_HEADER_LEN: usize = 12;
/// Sub-chunk id + 4-byte length
const SUBCHUNK_HEADER_LEN: usize = 8;
/// Smallest `fmt ` body that carries channels, rate and bits per sample
const FMT_BODY_MIN_LEN: usize = 16;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The chunk opened with a RIFF/WAVE header.
    Wave,
    /// No header; the chunk is PCM from its first byte.
    Raw,
}

/// Result of inspecting the first chunk of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub format: AudioFormat,
    pub container: Container,
    /// Offset of the first PCM byte within the sniffed chunk.
    pub payload_offset: usize,
}

impl Sniffed {
    /// PCM bytes of the sniffed chunk.
    pub fn payload<'a>(&self, chunk: &'a [u8]) -> &'a [u8] {
        &chunk[self.payload_offset.min(chunk.len())..]
    }
}

/// True when `chunk` starts with the 12-byte RIFF/WAVE magic.
pub fn is_wav_header(chunk: &[u8]) -> bool {
    chunk.len() >= RIFF_HEADER_LEN && &chunk[0..4] == RIFF_ID && &chunk[8..12] == WAVE_ID
}

/// Determine the stream format and the first payload byte from the first chunk.
///
/// With a header, the `fmt ` sub-chunk supplies the format and the payload
/// starts right after the `data` marker and its length field. A header whose
/// `fmt ` sub-chunk is missing or unusable keeps `fallback` as the format; a
/// header whose `data` marker is not inside this chunk hands the whole chunk
/// to the decoder. Without a header the format is `fallback` and the whole
/// chunk is payload.
pub fn sniff(chunk: &[u8], fallback: AudioFormat) -> Sniffed {
    if !is_wav_header(chunk) {
        debug!("First chunk has no WAV header, decoding it as raw PCM");
        return Sniffed {
            format: fallback,
            container: Container::Raw,
            payload_offset: 0,
        };
    }

    debug!("Detected WAV header");
    let layout = scan_subchunks(chunk);

    let format = layout.format.unwrap_or_else(|| {
        warn!("WAV header has no usable fmt sub-chunk, assuming {}", fallback);
        fallback
    });

    let payload_offset = match layout.data_offset {
        Some(offset) if offset <= chunk.len() => offset,
        _ => {
            warn!(
                "No data sub-chunk within the first {} bytes, decoding the whole chunk as PCM",
                chunk.len()
            );
            0
        }
    };

    debug!("Audio parameters: {}, payload offset {}", format, payload_offset);
    Sniffed {
        format,
        container: Container::Wave,
        payload_offset,
    }
}

#[derive(Debug, Default)]
struct HeaderLayout {
    format: Option<AudioFormat>,
    data_offset: Option<usize>,
}

/// Walk the sub-chunks after the RIFF header until `data` or the end of the chunk.
fn scan_subchunks(chunk: &[u8]) -> HeaderLayout {
    let mut layout = HeaderLayout::default();
    let mut pos = RIFF_HEADER_LEN;

    while chunk.len().saturating_sub(pos) >= SUBCHUNK_HEADER_LEN {
        let id = &chunk[pos..pos + 4];
        let body = pos + SUBCHUNK_HEADER_LEN;

        if id == DATA_ID {
            layout.data_offset = Some(body);
            break;
        }

        let Some(size) = read_u32_le(chunk, pos + 4) else {
            break;
        };
        if id == FMT_ID {
            layout.format = parse_fmt(&chunk[body..]);
        }

        // Sub-chunks are padded to an even length.
        let size = size as usize;
        match size.checked_add(size & 1).and_then(|s| body.checked_add(s)) {
            Some(next) => pos = next,
            None => break,
        }
    }

    layout
}

fn parse_fmt(body: &[u8]) -> Option<AudioFormat> {
    if body.len() < FMT_BODY_MIN_LEN {
        return None;
    }

    let format_tag = read_u16_le(body, 0)?;
    let channels = read_u16_le(body, 2)?;
    let sample_rate = read_u32_le(body, 4)?;
    let bits_per_sample = read_u16_le(body, 14)?;

    if channels == 0 || sample_rate == 0 {
        return None;
    }
    if format_tag != WAVE_FORMAT_PCM && format_tag != WAVE_FORMAT_EXTENSIBLE {
        warn!("WAV format tag {:#06x} is not integer PCM, decoding as PCM anyway", format_tag);
    }

    Some(AudioFormat::new(channels, bits_per_sample / 8, sample_rate))
}

fn read_u16_le(bytes: &[u8], at: usize) -> Option<u16> {
    let raw = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Read a complete WAV file into a normalized waveform.
pub fn load_wav_file<P: AsRef<Path>>(path: P) -> Result<Waveform, PipelineError> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    debug!(
        "Loading {}: channels={}, bits={}, sample_rate={}, format={:?}",
        path.display(),
        spec.channels,
        spec.bits_per_sample,
        spec.sample_rate,
        spec.sample_format
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(Waveform::from_interleaved(
        samples,
        spec.channels,
        spec.sample_rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(channels: u16, bits: u16, sample_rate: u32) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let mut out = Vec::new();
        out.extend_from_slice(RIFF_ID);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(WAVE_ID);
        out.extend_from_slice(FMT_ID);
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(DATA_ID);
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out
    }

    #[test]
    fn test_sniff_canonical_header() {
        let mut chunk = header(2, 16, 24_000);
        chunk.extend_from_slice(&[1, 2, 3, 4]);

        let sniffed = sniff(&chunk, AudioFormat::default());
        assert_eq!(sniffed.container, Container::Wave);
        assert_eq!(sniffed.format, AudioFormat::new(2, 2, 24_000));
        assert_eq!(sniffed.payload_offset, 44);
        assert_eq!(sniffed.payload(&chunk), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_sniff_without_magic_uses_fallback() {
        let chunk = [0x10, 0x00, 0xF0, 0xFF];
        let fallback = AudioFormat::new(1, 2, 32_000);

        let sniffed = sniff(&chunk, fallback);
        assert_eq!(sniffed.container, Container::Raw);
        assert_eq!(sniffed.format, fallback);
        assert_eq!(sniffed.payload(&chunk), &chunk);
    }

    #[test]
    fn test_sniff_header_only_chunk_has_empty_payload() {
        let chunk = header(1, 16, 32_000);
        let sniffed = sniff(&chunk, AudioFormat::default());
        assert_eq!(sniffed.payload_offset, chunk.len());
        assert!(sniffed.payload(&chunk).is_empty());
    }

    #[test]
    fn test_sniff_skips_unknown_subchunks() {
        let mut chunk = header(1, 8, 16_000);
        // Move "data" behind a LIST chunk whose body contains the word "data".
        let data = chunk.split_off(36);
        chunk.extend_from_slice(b"LIST");
        chunk.extend_from_slice(&5u32.to_le_bytes());
        chunk.extend_from_slice(b"data!");
        chunk.push(0); // pad byte
        chunk.extend_from_slice(&data);
        chunk.extend_from_slice(&[0x80, 0x80]);

        let sniffed = sniff(&chunk, AudioFormat::default());
        assert_eq!(sniffed.format, AudioFormat::new(1, 1, 16_000));
        assert_eq!(sniffed.payload(&chunk), &[0x80, 0x80]);
    }

    #[test]
    fn test_sniff_oversized_subchunk_ends_scan() {
        let mut chunk = header(1, 16, 32_000);
        // A LIST chunk claiming u32::MAX bytes hides the data marker.
        let data = chunk.split_off(36);
        chunk.extend_from_slice(b"LIST");
        chunk.extend_from_slice(&u32::MAX.to_le_bytes());
        chunk.extend_from_slice(&data);

        let sniffed = sniff(&chunk, AudioFormat::default());
        assert_eq!(sniffed.container, Container::Wave);
        assert_eq!(sniffed.format, AudioFormat::new(1, 2, 32_000));
        assert_eq!(sniffed.payload_offset, 0);
    }

    #[test]
    fn test_sniff_truncated_header_keeps_whole_chunk() {
        let full = header(1, 16, 22_050);
        let chunk = &full[..30];

        let sniffed = sniff(chunk, AudioFormat::default());
        assert_eq!(sniffed.container, Container::Wave);
        // fmt body is cut short, so the fallback format applies
        assert_eq!(sniffed.format, AudioFormat::default());
        assert_eq!(sniffed.payload_offset, 0);
    }

    #[test]
    fn test_sniff_missing_data_marker_keeps_whole_chunk() {
        let full = header(1, 32, 48_000);
        let chunk = &full[..40];

        let sniffed = sniff(chunk, AudioFormat::default());
        assert_eq!(sniffed.format, AudioFormat::new(1, 4, 48_000));
        assert_eq!(sniffed.payload_offset, 0);
    }

    #[test]
    fn test_sniff_does_not_validate_sample_width() {
        let chunk = header(1, 24, 44_100);
        let sniffed = sniff(&chunk, AudioFormat::default());
        assert_eq!(sniffed.format.sample_width, 3);
    }

    #[test]
    fn test_is_wav_header_requires_both_markers() {
        assert!(!is_wav_header(b"RIFF"));
        assert!(!is_wav_header(b"RIFF\0\0\0\0AVI "));
        assert!(is_wav_header(b"RIFF\0\0\0\0WAVE"));
    }
}
