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

//! The control-path side of a playback session: loading, sibling navigation,
//! loop mode selection and persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::browser::SiblingFiles;
use crate::config::{Configuration, EngineSettings, PersistenceError};
use crate::modes::{LoopMode, ModeSelector, NUM_LOOP_MODES};
use crate::playback::Engine;
use crate::samples::{LoadError, SampleBuffer, SampleLoader, SampleStore, WavDecoder};

/// Owns the shared state a playback [`Engine`] reads from and everything
/// that only the control path touches.
pub struct Session {
    settings: EngineSettings,
    store: Arc<SampleStore>,
    modes: Arc<ModeSelector>,
    /// The path most recently requested for loading.
    last_path: Option<PathBuf>,
    siblings: SiblingFiles,
}

impl Session {
    pub fn new(settings: EngineSettings) -> Session {
        let loader = SampleLoader::new(Box::new(WavDecoder), settings.resample_to());
        Session {
            settings,
            store: Arc::new(SampleStore::new(loader)),
            modes: Arc::new(ModeSelector::default()),
            last_path: None,
            siblings: SiblingFiles::default(),
        }
    }

    /// Creates an engine that plays from this session's store and follows
    /// its loop mode.
    pub fn engine(&self) -> Engine {
        Engine::new(self.store.clone(), self.modes.clone(), &self.settings)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    pub fn siblings(&self) -> &SiblingFiles {
        &self.siblings
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.modes.get()
    }

    /// Selects a loop mode. Running engines pick it up on their next tick and
    /// restart ping-pong travel forward.
    pub fn set_mode(&self, mode: LoopMode) {
        info!(mode = %mode, "Loop mode selected");
        self.modes.set(mode);
    }

    /// Selects a loop mode by its persisted integer, wrapping out-of-range values.
    pub fn set_mode_index(&self, index: i64) {
        self.set_mode(LoopMode::from_index(index));
    }

    pub fn mode_lights(&self) -> [f32; NUM_LOOP_MODES] {
        self.loop_mode().lights()
    }

    /// Loads a sample and rescans its directory. On failure the previous
    /// buffer keeps playing and the remembered path is unchanged.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<SampleBuffer>, LoadError> {
        match self.store.load(path) {
            Ok(buffer) => {
                self.last_path = Some(path.to_path_buf());
                self.rescan(path);
                info!(
                    path = ?path,
                    index = ?self.siblings.current(),
                    siblings = self.siblings.files().len(),
                    "Loaded sample"
                );
                Ok(buffer)
            }
            Err(e) => {
                error!(path = ?path, err = %e, "Unable to load sample");
                Err(e)
            }
        }
    }

    /// Loads the file after the current one in its directory, wrapping
    /// around. Returns `None` when there is nothing to move to.
    pub fn next_file(&mut self) -> Option<Result<Arc<SampleBuffer>, LoadError>> {
        let next = self.siblings.next()?.to_path_buf();
        Some(self.load_file(&next))
    }

    /// Loads the file before the current one in its directory, wrapping
    /// around. Returns `None` when there is nothing to move to.
    pub fn previous_file(&mut self) -> Option<Result<Arc<SampleBuffer>, LoadError>> {
        let previous = self.siblings.previous()?.to_path_buf();
        Some(self.load_file(&previous))
    }

    fn rescan(&mut self, path: &Path) {
        self.siblings = SiblingFiles::scan(path, self.settings.extensions());
    }

    /// The durable part of this session.
    pub fn to_configuration(&self) -> Configuration {
        Configuration::new(
            self.last_path
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            self.loop_mode(),
        )
    }

    /// Applies a persisted configuration: selects its loop mode and, if it
    /// names a path, reloads that file and rescans its directory.
    ///
    /// The path is remembered even when the reload fails so that saving again
    /// does not forget it.
    pub fn from_configuration(&mut self, configuration: &Configuration) -> Result<(), LoadError> {
        self.set_mode(configuration.loop_mode());

        let Some(path) = configuration.last_path() else {
            return Ok(());
        };
        let path = PathBuf::from(path);
        self.last_path = Some(path.clone());
        let loaded = self.store.load(&path);
        self.rescan(&path);
        loaded.map(|_| ())
    }

    /// Writes this session's configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        self.to_configuration().write(path)
    }

    /// Restores a session saved with [`Session::save`]. A missing document
    /// restores the defaults. Returns the reload error, if any, separately so
    /// that a missing sample does not prevent the mode from being restored.
    pub fn restore(&mut self, path: &Path) -> Result<Option<LoadError>, PersistenceError> {
        let configuration = Configuration::read(path)?.unwrap_or_default();
        info!(path = ?path, last_path = ?configuration.last_path(), mode = %configuration.loop_mode(), "Restoring session");
        Ok(self.from_configuration(&configuration).err())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("mode", &self.loop_mode())
            .field("last_path", &self.last_path)
            .field("siblings", &self.siblings.files().len())
            .finish()
    }
}
