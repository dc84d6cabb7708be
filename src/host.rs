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

//! A deterministic, offline host that drives an [`Engine`] tick by tick.
//!
//! It stands in for a live audio callback: it synthesizes the trigger, pitch
//! and mode-select inputs from a schedule, collects the outputs and can write
//! the rendered audio to a WAV file.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::modes::{LoopMode, TriggerMode, NUM_LOOP_MODES};
use crate::playback::{Engine, TickInputs, TickOutputs};

/// Trigger input level while the gate is held high.
const GATE_HIGH: f32 = 10.0;

/// When the trigger input goes high, and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSchedule {
    /// Nothing patched into the trigger input.
    Disconnected,
    /// A single gate at tick zero.
    Once { gate_ticks: usize },
    /// A gate at tick zero and then every `period_ticks`.
    Every { period_ticks: usize, gate_ticks: usize },
}

impl TriggerSchedule {
    /// The trigger input at `tick`.
    pub fn value_at(&self, tick: usize) -> Option<f32> {
        let (offset, gate_ticks) = match *self {
            TriggerSchedule::Disconnected => return None,
            TriggerSchedule::Once { gate_ticks } => (tick, gate_ticks),
            TriggerSchedule::Every {
                period_ticks,
                gate_ticks,
            } => (tick % period_ticks.max(1), gate_ticks),
        };
        // A gate always lasts at least one tick and must drop before the next
        // one begins, otherwise the retrigger is never seen as an edge.
        let high = match *self {
            TriggerSchedule::Every { period_ticks, .. } if period_ticks > 1 => {
                offset < gate_ticks.clamp(1, period_ticks - 1)
            }
            _ => offset < gate_ticks.max(1),
        };
        Some(if high { GATE_HIGH } else { 0.0 })
    }
}

/// Everything the offline host feeds the engine besides the sample itself.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Total ticks to render.
    pub ticks: usize,
    pub trigger: TriggerSchedule,
    pub trigger_mode: TriggerMode,
    pub pitch_knob: f32,
    pub pitch_cv: Option<f32>,
    /// Ticks on which the mode-select button is pressed.
    pub mode_presses: Vec<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            ticks: 0,
            trigger: TriggerSchedule::Once { gate_ticks: 1 },
            trigger_mode: TriggerMode::OneShot,
            pitch_knob: 0.0,
            pitch_cv: None,
            mode_presses: Vec::new(),
        }
    }
}

impl RenderOptions {
    /// The host inputs for `tick`.
    pub fn inputs_at(&self, tick: usize) -> TickInputs {
        TickInputs {
            trigger: self.trigger.value_at(tick),
            pitch_knob: self.pitch_knob,
            pitch_cv: self.pitch_cv,
            trigger_mode: self.trigger_mode.switch_value(),
            mode_select: if self.mode_presses.contains(&tick) {
                GATE_HIGH
            } else {
                0.0
            },
        }
    }
}

/// The result of an offline render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Render {
    /// The audio output, one value per tick, at engine scale.
    pub audio: Vec<f32>,
    /// Ticks on which the playing indicator was lit.
    pub playing_ticks: usize,
    /// Mode indicators after the last tick.
    pub mode_lights: [f32; NUM_LOOP_MODES],
}

impl Render {
    /// The loop mode shown by the indicators after the last tick.
    pub fn final_mode(&self) -> Option<LoopMode> {
        self.mode_lights
            .iter()
            .position(|light| *light > 0.0)
            .map(|index| LoopMode::from_index(index as i64))
    }

    /// Writes the audio to a mono 32-bit float WAV file. Samples are divided
    /// by `gain` so that a full-scale sample lands at 1.0.
    pub fn write_wav(&self, path: &Path, sample_rate: u32, gain: f32) -> Result<(), hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let scale = if gain != 0.0 { 1.0 / gain } else { 1.0 };

        let mut writer = WavWriter::create(path, spec)?;
        for sample in &self.audio {
            writer.write_sample(sample * scale)?;
        }
        writer.finalize()?;

        info!(path = ?path, frames = self.audio.len(), sample_rate, "Wrote render");
        Ok(())
    }
}

/// Runs `engine` for `options.ticks` ticks.
pub fn render(engine: &mut Engine, options: &RenderOptions) -> Render {
    info!(
        ticks = options.ticks,
        trigger = ?options.trigger,
        trigger_mode = ?options.trigger_mode,
        pitch_knob = options.pitch_knob,
        pitch_cv = ?options.pitch_cv,
        "Rendering"
    );

    let mut result = Render {
        audio: Vec::with_capacity(options.ticks),
        ..Default::default()
    };
    let mut last = TickOutputs::default();
    for tick in 0..options.ticks {
        last = engine.tick(&options.inputs_at(tick));
        result.audio.push(last.audio);
        if last.playing > 0.0 {
            result.playing_ticks += 1;
        }
    }
    result.mode_lights = last.mode_lights;
    result
}
