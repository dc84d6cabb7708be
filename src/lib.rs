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

//! Trigger-driven sample playback.
//!
//! A [`playback::Engine`] produces one output sample per host tick from a
//! buffer held in a shared [`samples::SampleStore`]. A [`session::Session`]
//! owns the control-path side: loading files, stepping through sibling files,
//! selecting the loop mode and persisting all of it.

pub mod browser;
pub mod config;
pub mod host;
pub mod modes;
pub mod playback;
pub mod samples;
pub mod session;
pub mod trigger;
pub mod util;

#[cfg(test)]
mod testutil;
