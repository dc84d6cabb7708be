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

//! Loop and trigger modes, and the shared mode selection used by both the
//! control path and the audio tick.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Number of loop modes, and so the number of mode indicator lights.
pub const NUM_LOOP_MODES: usize = 4;

/// How the read position behaves when it reaches the end of the sample.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play once and stop at the end of the buffer.
    #[default]
    Off,
    /// Wrap back to the start forever.
    Loop,
    /// Bounce back and forth between the buffer boundaries.
    PingPong,
    /// Reserved for crossfaded looping. Plays like `Off` for now.
    CrossfadeLoop,
}

impl LoopMode {
    /// All modes in selection order.
    pub const ALL: [LoopMode; NUM_LOOP_MODES] = [
        LoopMode::Off,
        LoopMode::Loop,
        LoopMode::PingPong,
        LoopMode::CrossfadeLoop,
    ];

    /// Returns the mode for an integer, wrapping out-of-range values
    /// (including negative ones) back into range.
    pub fn from_index(index: i64) -> LoopMode {
        Self::ALL[index.rem_euclid(NUM_LOOP_MODES as i64) as usize]
    }

    /// The integer this mode is persisted as.
    pub fn index(self) -> usize {
        match self {
            LoopMode::Off => 0,
            LoopMode::Loop => 1,
            LoopMode::PingPong => 2,
            LoopMode::CrossfadeLoop => 3,
        }
    }

    /// The next mode in the selection cycle.
    pub fn next(self) -> LoopMode {
        Self::from_index(self.index() as i64 + 1)
    }

    /// One-hot indicator brightness for this mode.
    pub fn lights(self) -> [f32; NUM_LOOP_MODES] {
        let mut lights = [0.0; NUM_LOOP_MODES];
        lights[self.index()] = 1.0;
        lights
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopMode::Off => "off",
            LoopMode::Loop => "loop",
            LoopMode::PingPong => "ping_pong",
            LoopMode::CrossfadeLoop => "crossfade_loop",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "off" => Ok(LoopMode::Off),
            "loop" => Ok(LoopMode::Loop),
            "ping_pong" | "pingpong" => Ok(LoopMode::PingPong),
            "crossfade_loop" | "crossfade" => Ok(LoopMode::CrossfadeLoop),
            other => match other.parse::<i64>() {
                Ok(index) => Ok(LoopMode::from_index(index)),
                Err(_) => Err(format!("unknown loop mode '{}'", s)),
            },
        }
    }
}

/// Whether a falling trigger edge stops playback.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Ignore falling edges; the sample plays until its loop policy stops it.
    #[default]
    OneShot,
    /// Stop playback when the trigger falls.
    Gate,
}

impl TriggerMode {
    /// Reads the trigger-mode switch. Anything above zero selects gate mode.
    #[inline]
    pub fn from_switch(value: f32) -> TriggerMode {
        if value > 0.0 {
            TriggerMode::Gate
        } else {
            TriggerMode::OneShot
        }
    }

    /// The switch value that selects this mode.
    pub fn switch_value(self) -> f32 {
        match self {
            TriggerMode::OneShot => 0.0,
            TriggerMode::Gate => 1.0,
        }
    }
}

/// Loop mode selection shared between the control path and the tick path.
///
/// The mode is packed with a generation counter that every selection bumps,
/// including re-selecting the current mode. Readers compare generations to
/// notice selections, never the mode value alone. Readers never block.
#[derive(Debug, Default)]
pub struct ModeSelector {
    /// Generation in the upper 24 bits, mode index in the low 8.
    state: AtomicU32,
}

const MODE_BITS: u32 = 8;
const MODE_MASK: u32 = (1 << MODE_BITS) - 1;

fn pack(mode: LoopMode, generation: u32) -> u32 {
    (generation << MODE_BITS) | mode.index() as u32
}

fn unpack(state: u32) -> (LoopMode, u32) {
    (
        LoopMode::from_index(i64::from(state & MODE_MASK)),
        state >> MODE_BITS,
    )
}

impl ModeSelector {
    pub fn new(mode: LoopMode) -> Self {
        Self {
            state: AtomicU32::new(pack(mode, 0)),
        }
    }

    #[inline]
    pub fn get(&self) -> LoopMode {
        self.snapshot().0
    }

    /// The current mode and the generation it was selected in, read together.
    #[inline]
    pub fn snapshot(&self) -> (LoopMode, u32) {
        unpack(self.state.load(Ordering::Acquire))
    }

    /// Selects `mode` and starts a new generation, even if `mode` is already
    /// selected.
    pub fn set(&self, mode: LoopMode) {
        self.update(|_| mode);
    }

    /// Advances to the next mode and returns it.
    pub fn advance(&self) -> LoopMode {
        self.update(LoopMode::next)
    }

    fn update(&self, select: impl Fn(LoopMode) -> LoopMode) -> LoopMode {
        let mut selected = LoopMode::default();
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (mode, generation) = unpack(state);
                selected = select(mode);
                Some(pack(selected, generation.wrapping_add(1) & (u32::MAX >> MODE_BITS)))
            });
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order() {
        let mut mode = LoopMode::Off;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(
            seen,
            vec![
                LoopMode::Off,
                LoopMode::Loop,
                LoopMode::PingPong,
                LoopMode::CrossfadeLoop,
                LoopMode::Off,
            ]
        );
    }

    #[test]
    fn test_from_index_wraps() {
        assert_eq!(LoopMode::from_index(0), LoopMode::Off);
        assert_eq!(LoopMode::from_index(3), LoopMode::CrossfadeLoop);
        assert_eq!(LoopMode::from_index(4), LoopMode::Off);
        assert_eq!(LoopMode::from_index(6), LoopMode::PingPong);
        assert_eq!(LoopMode::from_index(-1), LoopMode::CrossfadeLoop);
    }

    #[test]
    fn test_lights_are_one_hot() {
        for mode in LoopMode::ALL {
            let lights = mode.lights();
            assert_eq!(lights.iter().filter(|l| **l == 1.0).count(), 1);
            assert_eq!(lights[mode.index()], 1.0);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("off".parse::<LoopMode>().unwrap(), LoopMode::Off);
        assert_eq!("ping-pong".parse::<LoopMode>().unwrap(), LoopMode::PingPong);
        assert_eq!("Loop".parse::<LoopMode>().unwrap(), LoopMode::Loop);
        assert_eq!("3".parse::<LoopMode>().unwrap(), LoopMode::CrossfadeLoop);
        assert!("sideways".parse::<LoopMode>().is_err());
        assert_eq!(
            LoopMode::PingPong.to_string().parse::<LoopMode>().unwrap(),
            LoopMode::PingPong
        );
    }

    #[test]
    fn test_trigger_mode_switch() {
        assert_eq!(TriggerMode::from_switch(0.0), TriggerMode::OneShot);
        assert_eq!(TriggerMode::from_switch(-1.0), TriggerMode::OneShot);
        assert_eq!(TriggerMode::from_switch(0.01), TriggerMode::Gate);
        assert_eq!(
            TriggerMode::from_switch(TriggerMode::Gate.switch_value()),
            TriggerMode::Gate
        );
    }

    #[test]
    fn test_selector_advance() {
        let selector = ModeSelector::new(LoopMode::PingPong);
        assert_eq!(selector.advance(), LoopMode::CrossfadeLoop);
        assert_eq!(selector.advance(), LoopMode::Off);
        assert_eq!(selector.get(), LoopMode::Off);
    }

    #[test]
    fn test_selector_generations() {
        let selector = ModeSelector::new(LoopMode::PingPong);
        let (mode, first) = selector.snapshot();
        assert_eq!(mode, LoopMode::PingPong);

        selector.set(LoopMode::PingPong);
        let (mode, second) = selector.snapshot();
        assert_eq!(mode, LoopMode::PingPong);
        assert_ne!(first, second);

        selector.advance();
        assert_ne!(selector.snapshot().1, second);
    }

    #[test]
    fn test_selector_concurrent_advances_are_not_lost() {
        let selector = std::sync::Arc::new(ModeSelector::new(LoopMode::Off));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let selector = selector.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        selector.advance();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 4000 advances is a whole number of cycles.
        let (mode, generation) = selector.snapshot();
        assert_eq!(mode, LoopMode::Off);
        assert_eq!(generation, 4000);
    }
}
