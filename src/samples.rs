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

//! Sample decoding and storage.
//!
//! This module provides:
//! - WAV decoding into a single-channel in-memory buffer
//! - Optional transcoding to a host sample rate
//! - A store whose buffer can be swapped atomically while the audio tick reads it

mod buffer;
mod error;
mod loader;
mod store;

pub use buffer::SampleBuffer;
pub use error::LoadError;
pub use loader::{DecodedSample, SampleDecoder, SampleLoader, WavDecoder};
pub use store::SampleStore;
