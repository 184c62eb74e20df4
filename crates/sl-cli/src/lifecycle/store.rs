//! Persistence of the daemon identity record.
//!
//! The record is the decimal PID of the running daemon followed by a newline.
//! It is written once after a successful handshake and removed after a
//! confirmed stop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::LifecycleError;

/// Storage for the daemon identity record.
pub trait StateStore {
    /// Returns the recorded PID, or `None` when no record exists.
    fn read(&self) -> Result<Option<u32>, LifecycleError>;

    /// Records `pid` as the running daemon.
    fn write(&self, pid: u32) -> Result<(), LifecycleError>;

    /// Removes the record. Missing records are not an error.
    fn clear(&self) -> Result<(), LifecycleError>;
}

/// Identity record kept in a PID file.
#[derive(Debug, Clone)]
pub struct FilePidStore {
    path: PathBuf,
}

impl FilePidStore {
    /// Builds a store backed by the PID file at `path`.
    ///
    /// The file is not touched until the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the PID file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FilePidStore {
    fn read(&self) -> Result<Option<u32>, LifecycleError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LifecycleError::ReadPid {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<u32>()
            .map(Some)
            .map_err(|source| LifecycleError::ParsePid {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, pid: u32) -> Result<(), LifecycleError> {
        fs::write(&self.path, format!("{pid}\n")).map_err(|source| LifecycleError::WritePid {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), LifecycleError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LifecycleError::ClearPid {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
