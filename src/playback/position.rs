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
use crate::modes::LoopMode;

/// Travel direction of the read position. Only ping-pong mode reverses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// The read cursor of a playing sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    /// Fractional position in frames. Ping-pong reflection can leave this
    /// briefly negative.
    pub position: f64,
    pub playing: bool,
    pub direction: Direction,
}

impl PlaybackState {
    /// Rewinds to the first frame and starts playing.
    pub fn start(&mut self) {
        self.position = 0.0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// The frame to read at the current position. Negative positions wrap
    /// from the end of the buffer.
    #[inline]
    pub fn read_index(&self, frame_count: usize) -> i64 {
        if self.position >= 0.0 {
            self.position.floor() as i64
        } else {
            (frame_count as f64 - 1.0 + self.position).floor() as i64
        }
    }

    /// Moves the cursor by `rate` frames according to the loop policy and
    /// stops playback when the policy says so.
    #[inline]
    pub fn advance(&mut self, mode: LoopMode, rate: f64, frame_count: usize) {
        if frame_count == 0 {
            self.playing = false;
            return;
        }
        let len = frame_count as f64;

        match mode {
            LoopMode::Off | LoopMode::CrossfadeLoop => {
                self.position += rate;
                if self.position.floor().abs() >= len {
                    self.playing = false;
                }
            }
            LoopMode::Loop => {
                self.position = (self.position + rate).rem_euclid(len);
            }
            LoopMode::PingPong => match self.direction {
                Direction::Forward => {
                    if self.position + rate < len {
                        self.position += rate;
                    } else {
                        self.position = 2.0 * len - self.position - rate;
                        self.direction = Direction::Reverse;
                    }
                }
                Direction::Reverse => {
                    if self.position - rate >= 0.0 {
                        self.position -= rate;
                    } else {
                        self.position = (self.position - rate).abs();
                        self.direction = Direction::Forward;
                    }
                }
            },
        }
    }
}
