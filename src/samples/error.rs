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
use std::path::{Path, PathBuf};

/// Reasons a sample could not be loaded. Every variant leaves the previously
/// loaded buffer in place.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Sample file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported sample file {}: {reason}", path.display())]
    Unsupported { path: PathBuf, reason: String },

    #[error("Sample file {} contains no audio", .0.display())]
    Empty(PathBuf),

    #[error("Failed to decode {}: {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

impl LoadError {
    /// Classifies a WAV reader error for the given file.
    pub(crate) fn from_wav(path: &Path, error: hound::Error) -> Self {
        match error {
            hound::Error::IoError(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
                LoadError::NotFound(path.to_path_buf())
            }
            hound::Error::FormatError(reason) => LoadError::Unsupported {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            },
            hound::Error::Unsupported => LoadError::Unsupported {
                path: path.to_path_buf(),
                reason: "unsupported WAV encoding".to_string(),
            },
            other => LoadError::DecodeFailed {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }

    /// The file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound(path) | LoadError::Empty(path) => path,
            LoadError::Unsupported { path, .. } | LoadError::DecodeFailed { path, .. } => path,
        }
    }
}
