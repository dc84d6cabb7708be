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

//! The sample store shared between the control path and the audio tick.
//!
//! Loading happens on the control path. The decoded buffer is published with a
//! single atomic handle swap, so the tick either sees the old buffer or the new
//! one and never a partially written one.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use tracing::{info, warn};

use super::buffer::SampleBuffer;
use super::error::LoadError;
use super::loader::SampleLoader;

pub struct SampleStore {
    loader: SampleLoader,
    buffer: ArcSwap<SampleBuffer>,
    /// Set when the last load succeeded.
    loaded: AtomicBool,
    /// Set while a load is in flight.
    loading: AtomicBool,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(SampleLoader::default())
    }
}

impl SampleStore {
    pub fn new(loader: SampleLoader) -> Self {
        Self {
            loader,
            buffer: ArcSwap::from_pointee(SampleBuffer::empty()),
            loaded: AtomicBool::new(false),
            loading: AtomicBool::new(false),
        }
    }

    /// Decodes `path` and swaps it in. On failure the previous buffer stays in
    /// place but the store no longer reports itself as loaded.
    ///
    /// Performs file I/O; never call this from the audio tick.
    pub fn load(&self, path: &Path) -> Result<Arc<SampleBuffer>, LoadError> {
        self.loading.store(true, Ordering::Release);
        let result = self.loader.load(path);
        let result = match result {
            Ok(buffer) => {
                let buffer = Arc::new(buffer);
                self.buffer.store(Arc::clone(&buffer));
                self.loaded.store(true, Ordering::Release);
                info!(sample = buffer.name(), "Sample swapped in");
                Ok(buffer)
            }
            Err(e) => {
                self.loaded.store(false, Ordering::Release);
                warn!(path = ?path, error = %e, "Failed to load sample, keeping previous buffer");
                Err(e)
            }
        };
        self.loading.store(false, Ordering::Release);
        result
    }

    /// Publishes an already decoded buffer.
    pub fn replace(&self, buffer: SampleBuffer) {
        let loaded = !buffer.is_empty();
        self.buffer.store(Arc::new(buffer));
        self.loaded.store(loaded, Ordering::Release);
    }

    /// Drops the current buffer.
    pub fn clear(&self) {
        self.replace(SampleBuffer::empty());
    }

    /// A lock-free view of the current buffer for the duration of one tick.
    #[inline]
    pub fn snapshot(&self) -> Guard<Arc<SampleBuffer>> {
        self.buffer.load()
    }

    /// Returns the current buffer as an owned handle.
    pub fn current(&self) -> Arc<SampleBuffer> {
        self.buffer.load_full()
    }

    /// Returns the frame at `index`, or silence when out of range or empty.
    pub fn frame_at(&self, index: i64) -> f32 {
        self.buffer.load().frame_at(index)
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.load().frame_count()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buffer = self.buffer.load();
        f.debug_struct("SampleStore")
            .field("sample", &buffer.name())
            .field("frames", &buffer.frame_count())
            .field("loaded", &self.is_loaded())
            .field("loading", &self.is_loading())
            .finish()
    }
}
