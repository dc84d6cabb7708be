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

//! Per-tick sample playback.
//!
//! This module provides:
//! - The fractional read position and its loop policies
//! - The engine that turns host inputs into one output value per tick

mod engine;
mod position;

pub use engine::{playback_rate, Engine, TickInputs, TickOutputs};
pub use position::{Direction, PlaybackState};
