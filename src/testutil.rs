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
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes planar samples (one Vec per channel) to a 32-bit WAV file.
/// The sample format follows the sample type.
pub fn write_wav<S: hound::Sample + Copy + 'static>(
    path: PathBuf,
    samples: Vec<Vec<S>>,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;

    let sample_format = if std::any::TypeId::of::<S>() == std::any::TypeId::of::<f32>() {
        SampleFormat::Float
    } else if std::any::TypeId::of::<S>() == std::any::TypeId::of::<i32>() {
        SampleFormat::Int
    } else {
        return Err("Unsupported sample format".into());
    };

    let num_channels = samples.len();
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format,
        },
    )?;

    let frames = samples.iter().map(|c| c.len()).max().unwrap_or(0);
    for frame in 0..frames {
        for channel in &samples {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Writes a mono float WAV of `frames` frames whose every sample is non-zero.
pub fn write_tone(path: PathBuf, frames: usize, sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let samples = (0..frames)
        .map(|i| 0.25 + 0.5 * ((i % 8) as f32 / 8.0))
        .collect();
    write_wav(path, vec![samples], sample_rate)
}

/// Creates an empty file with the given name inside `dir`.
pub fn touch(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).expect("unable to create file");
    path
}
