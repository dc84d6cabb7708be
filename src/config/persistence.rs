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
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::PersistenceError;
use crate::modes::LoopMode;

/// The durable part of a session: the last loaded file and the loop mode.
///
/// Stored as `{ "lastPath": "...", "playMode": 2 }`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Absent or empty means nothing should be reloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_path: Option<String>,

    /// Loop mode as an integer. Out-of-range values wrap when read back.
    #[serde(default)]
    play_mode: i64,
}

impl Configuration {
    pub fn new(last_path: Option<String>, mode: LoopMode) -> Configuration {
        Configuration {
            last_path,
            play_mode: mode.index() as i64,
        }
    }

    /// The path to reload, if any. Empty paths count as absent.
    pub fn last_path(&self) -> Option<&str> {
        self.last_path.as_deref().filter(|path| !path.is_empty())
    }

    /// The persisted integer exactly as stored.
    pub fn play_mode(&self) -> i64 {
        self.play_mode
    }

    pub fn loop_mode(&self) -> LoopMode {
        LoopMode::from_index(self.play_mode)
    }

    /// Reads a document from disk. A missing file yields `None`.
    pub fn read(path: &Path) -> Result<Option<Configuration>, PersistenceError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "No session document found");
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let configuration =
            serde_json::from_str(&data).map_err(|source| PersistenceError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Some(configuration))
    }

    /// Writes the document as pretty JSON, creating parent directories if
    /// they don't exist.
    pub fn write(&self, path: &Path) -> Result<(), PersistenceError> {
        let io_error = |source: io::Error| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_error)?;

        info!(path = ?path, last_path = ?self.last_path, play_mode = self.play_mode, "Saved session");
        Ok(())
    }
}
