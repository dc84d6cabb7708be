// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample decoding for triggered playback.
//!
//! Samples are decoded entirely into memory before they reach the store, so the
//! audio tick never touches the filesystem.

use std::path::Path;

use hound::WavReader;
use tracing::{debug, info};

use super::buffer::SampleBuffer;
use super::error::LoadError;
use crate::util::filename_display;

/// Raw decoder output: interleaved samples plus the format they came in.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedSample {
    /// Interleaved samples scaled to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Turns a file into decoded samples.
pub trait SampleDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedSample, LoadError>;
}

/// Decodes PCM and IEEE float WAV files.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavDecoder;

impl SampleDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedSample, LoadError> {
        let mut reader = WavReader::open(path).map_err(|e| LoadError::from_wav(path, e))?;
        let spec = reader.spec();

        if spec.channels == 0 {
            return Err(LoadError::Unsupported {
                path: path.to_path_buf(),
                reason: "file declares zero channels".to_string(),
            });
        }

        let samples = match spec.sample_format {
            // Float samples are already in the correct range [-1.0, 1.0]
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                // Use i64 to avoid overflow for 32-bit samples
                let scale_factor = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 * scale_factor))
                    .collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| LoadError::from_wav(path, e))?;

        debug!(
            path = ?path,
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            "Decoded WAV file"
        );

        Ok(DecodedSample {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }
}

/// Loads files into single-channel [`SampleBuffer`]s.
pub struct SampleLoader {
    decoder: Box<dyn SampleDecoder>,
    /// When set, samples are transcoded to this rate after decoding.
    target_sample_rate: Option<u32>,
}

impl Default for SampleLoader {
    fn default() -> Self {
        Self::new(Box::new(WavDecoder), None)
    }
}

impl SampleLoader {
    pub fn new(decoder: Box<dyn SampleDecoder>, target_sample_rate: Option<u32>) -> Self {
        Self {
            decoder,
            target_sample_rate,
        }
    }

    /// Decodes a file and keeps its first channel.
    pub fn load(&self, path: &Path) -> Result<SampleBuffer, LoadError> {
        info!(path = ?path, "Loading sample into memory");

        let decoded = self.decoder.decode(path)?;
        let channels = decoded.channels.max(1) as usize;
        let first_channel: Vec<f32> = decoded.samples.iter().step_by(channels).copied().collect();

        if first_channel.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        let (frames, sample_rate) = match self.target_sample_rate {
            Some(target) if target != decoded.sample_rate && decoded.sample_rate > 0 => {
                info!(
                    source_rate = decoded.sample_rate,
                    target_rate = target,
                    "Transcoding sample"
                );
                (
                    transcode_frames(&first_channel, decoded.sample_rate, target),
                    target,
                )
            }
            _ => (first_channel, decoded.sample_rate),
        };

        let buffer = SampleBuffer::new(
            frames,
            sample_rate,
            decoded.channels,
            filename_display(path),
        );

        info!(
            path = ?path,
            channels = decoded.channels,
            sample_rate,
            frames = buffer.frame_count(),
            duration_ms = buffer.duration().as_millis(),
            memory_kb = buffer.memory_size() / 1024,
            "Sample loaded"
        );

        Ok(buffer)
    }
}

impl std::fmt::Debug for SampleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLoader")
            .field("target_sample_rate", &self.target_sample_rate)
            .finish()
    }
}

/// Transcodes mono frames from one sample rate to another using linear
/// interpolation.
fn transcode_frames(frames: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    let ratio = target_rate as f64 / source_rate as f64;
    let target_frames = (frames.len() as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames);
    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        let s0 = frames.get(source_frame).copied().unwrap_or(0.0);
        let s1 = frames.get(source_frame + 1).copied().unwrap_or(s0);
        output.push(s0 + (s1 - s0) * frac);
    }
    output
}
