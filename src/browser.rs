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

//! Sibling file discovery for next/previous sample navigation.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Lists the regular files in `directory` whose extension matches one of
/// `extensions`, sorted lexicographically. Extensions may be given with or
/// without the leading dot and are matched case sensitively.
///
/// Scan failures are logged and yield an empty list.
pub fn list_matching(directory: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(directory = ?directory, err = %e, "Unable to scan directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(directory = ?directory, err = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();
    files.sort();

    debug!(directory = ?directory, files = files.len(), "Scanned directory");
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension().and_then(OsStr::to_str).is_some_and(|ext| {
        extensions
            .iter()
            .any(|wanted| wanted.strip_prefix('.').unwrap_or(wanted) == ext)
    })
}

/// Finds `target` in a list produced by [`list_matching`]. Every entry is
/// checked, including the last. Entries share a directory, so they are
/// compared by file name.
pub fn index_of(sorted: &[PathBuf], target: &Path) -> Option<usize> {
    let name = target.file_name()?;
    sorted.iter().position(|path| path.file_name() == Some(name))
}

/// The files next to the currently loaded sample, and where it sits among them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiblingFiles {
    files: Vec<PathBuf>,
    current: Option<usize>,
}

impl SiblingFiles {
    /// Scans the directory containing `path` and locates `path` within it.
    pub fn scan(path: &Path, extensions: &[String]) -> SiblingFiles {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let files = list_matching(directory, extensions);
        let current = index_of(&files, path);
        if current.is_none() {
            debug!(path = ?path, "Loaded file is not among its listed siblings");
        }
        SiblingFiles { files, current }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file after the current one, wrapping to the first. Without a known
    /// current file this is the first file.
    pub fn next(&self) -> Option<&Path> {
        if self.files.is_empty() {
            return None;
        }
        let index = match self.current {
            Some(current) => (current + 1) % self.files.len(),
            None => 0,
        };
        Some(&self.files[index])
    }

    /// The file before the current one, wrapping to the last. Without a known
    /// current file this is the last file.
    pub fn previous(&self) -> Option<&Path> {
        if self.files.is_empty() {
            return None;
        }
        let index = match self.current {
            Some(0) | None => self.files.len() - 1,
            Some(current) => current - 1,
        };
        Some(&self.files[index])
    }
}
