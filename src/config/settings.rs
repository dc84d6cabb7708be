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
use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::trigger::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};

/// Tunables for the playback engine and the control path.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EngineSettings {
    /// Multiplier applied to every output sample.
    #[serde(default = "default_output_gain")]
    output_gain: f32,

    /// Trigger inputs at or above this value register a rising edge.
    #[serde(default = "default_trigger_high")]
    trigger_high: f32,

    /// Trigger inputs at or below this value re-arm the detector.
    #[serde(default = "default_trigger_low")]
    trigger_low: f32,

    /// The pitch knob contributes knob / divisor to the playback rate.
    #[serde(default = "default_pitch_knob_divisor")]
    pitch_knob_divisor: f32,

    /// File extensions, without the dot, that the directory browser lists.
    /// Matching is case sensitive.
    #[serde(default = "default_extensions")]
    extensions: Vec<String>,

    /// When set, loaded samples are transcoded to this rate.
    #[serde(default)]
    resample_to: Option<u32>,
}

fn default_output_gain() -> f32 {
    5.0
}

fn default_trigger_high() -> f32 {
    DEFAULT_HIGH_THRESHOLD
}

fn default_trigger_low() -> f32 {
    DEFAULT_LOW_THRESHOLD
}

fn default_pitch_knob_divisor() -> f32 {
    3.0
}

fn default_extensions() -> Vec<String> {
    vec!["wav".to_string(), "WAV".to_string()]
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            output_gain: default_output_gain(),
            trigger_high: default_trigger_high(),
            trigger_low: default_trigger_low(),
            pitch_knob_divisor: default_pitch_knob_divisor(),
            extensions: default_extensions(),
            resample_to: None,
        }
    }
}

impl EngineSettings {
    /// Parse settings from a file. The format follows the file extension.
    pub fn deserialize(path: &Path) -> Result<EngineSettings, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<EngineSettings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_high <= self.trigger_low {
            return Err(ConfigError::Invalid {
                field: "trigger_high",
                reason: format!(
                    "must be above trigger_low ({} <= {})",
                    self.trigger_high, self.trigger_low
                ),
            });
        }
        if self.pitch_knob_divisor == 0.0 || !self.pitch_knob_divisor.is_finite() {
            return Err(ConfigError::Invalid {
                field: "pitch_knob_divisor",
                reason: "must be a finite, non-zero number".to_string(),
            });
        }
        if self.resample_to == Some(0) {
            return Err(ConfigError::Invalid {
                field: "resample_to",
                reason: "sample rate must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    pub fn trigger_high(&self) -> f32 {
        self.trigger_high
    }

    pub fn trigger_low(&self) -> f32 {
        self.trigger_low
    }

    pub fn pitch_knob_divisor(&self) -> f32 {
        self.pitch_knob_divisor
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn resample_to(&self) -> Option<u32> {
        self.resample_to
    }
}
