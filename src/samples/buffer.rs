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
use std::time::Duration;

/// A decoded sample held in memory. Only the first channel of the source file
/// is retained; the original channel count is kept for reporting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    /// One value per frame.
    frames: Vec<f32>,
    /// Sample rate of the frames.
    sample_rate: u32,
    /// Number of channels in the file this was decoded from.
    channels: u16,
    /// Human readable source, usually the file name.
    name: String,
}

impl SampleBuffer {
    pub fn new(frames: Vec<f32>, sample_rate: u32, channels: u16, name: impl Into<String>) -> Self {
        Self {
            frames,
            sample_rate,
            channels,
            name: name.into(),
        }
    }

    /// An empty buffer, meaning nothing is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frame at `index`, or silence when the index falls outside
    /// the buffer.
    #[inline]
    pub fn frame_at(&self, index: i64) -> f32 {
        if index < 0 {
            return 0.0;
        }
        self.frames.get(index as usize).copied().unwrap_or(0.0)
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playback length at the buffer's own sample rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames.len() as f64 / self.sample_rate as f64)
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.frames.len() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_bounds() {
        let buffer = SampleBuffer::new(vec![0.1, 0.2, 0.3], 44100, 1, "three.wav");

        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.frame_at(0), 0.1);
        assert_eq!(buffer.frame_at(2), 0.3);
        assert_eq!(buffer.frame_at(3), 0.0);
        assert_eq!(buffer.frame_at(-1), 0.0);
        assert_eq!(buffer.frame_at(i64::MAX), 0.0);
    }

    #[test]
    fn test_empty() {
        let buffer = SampleBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.frame_at(0), 0.0);
        assert_eq!(buffer.duration(), Duration::ZERO);
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::new(vec![0.0; 441], 44100, 2, "short.wav");
        assert!((buffer.duration().as_secs_f64() - 0.01).abs() < 1e-9);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.memory_size(), 441 * 4);
    }
}
