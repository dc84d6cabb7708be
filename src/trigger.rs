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

//! Edge detection for continuous control signals.
//!
//! A [`SchmittTrigger`] latches high once the signal reaches the high threshold
//! and only unlatches once it falls to the low threshold, so a noisy signal
//! hovering between the two never produces repeated edges.

/// Default threshold a signal must reach to register a rising edge.
pub const DEFAULT_HIGH_THRESHOLD: f32 = 1.0;

/// Default threshold a signal must fall to before it can rise again.
pub const DEFAULT_LOW_THRESHOLD: f32 = 0.0;

/// A latching rising-edge detector with hysteresis.
#[derive(Clone, Copy, Debug)]
pub struct SchmittTrigger {
    high: f32,
    low: f32,
    latched: bool,
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD)
    }
}

impl SchmittTrigger {
    /// Creates a detector with the given thresholds.
    pub fn new(high: f32, low: f32) -> Self {
        Self {
            high,
            low,
            latched: false,
        }
    }

    /// Feeds one value and returns true exactly once per rising transition.
    #[inline]
    pub fn process(&mut self, value: f32) -> bool {
        if self.latched {
            if value <= self.low {
                self.latched = false;
            }
            false
        } else if value >= self.high {
            self.latched = true;
            true
        } else {
            false
        }
    }

    /// Creates a detector that starts latched, for signals whose idle level
    /// already sits at or above the high threshold.
    pub fn latched(high: f32, low: f32) -> Self {
        Self {
            high,
            low,
            latched: true,
        }
    }

    /// Whether the latch is currently high.
    pub fn is_high(&self) -> bool {
        self.latched
    }

    /// Clears the latch.
    pub fn reset(&mut self) {
        self.latched = false;
    }
}

/// Rising and falling edges observed on a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub rising: bool,
    pub falling: bool,
}

/// Detects both edges of a gate signal by running a second trigger on the
/// inverted signal (`1 - value`).
///
/// An idle gate sits at 0, so the inverted trigger starts latched and the
/// first sample never reports a falling edge.
#[derive(Clone, Copy, Debug)]
pub struct GateDetector {
    rise: SchmittTrigger,
    fall: SchmittTrigger,
}

impl Default for GateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD)
    }
}

impl GateDetector {
    /// Creates a detector whose rising and falling triggers share thresholds.
    pub fn new(high: f32, low: f32) -> Self {
        Self {
            rise: SchmittTrigger::new(high, low),
            fall: SchmittTrigger::latched(high, low),
        }
    }

    #[inline]
    pub fn process(&mut self, value: f32) -> Edges {
        Edges {
            rising: self.rise.process(value),
            falling: self.fall.process(1.0 - value),
        }
    }

    pub fn reset(&mut self) {
        self.rise = SchmittTrigger::new(self.rise.high, self.rise.low);
        self.fall = SchmittTrigger::latched(self.fall.high, self.fall.low);
    }
}
