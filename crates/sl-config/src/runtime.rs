//! Derives runtime artefact paths shared by the controller and daemon.
//!
//! The runtime directory houses the PID record and the daemon log. Both
//! binaries need to agree on the layout so lifecycle commands can find the
//! record written after a successful start.

use std::env;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;

#[cfg(unix)]
use dirs::runtime_dir;
#[cfg(unix)]
use libc::geteuid;

const RUNTIME_NAMESPACE: &str = "sl-daemon";
const PID_FILE_NAME: &str = "sl-daemon.pid";
const LOG_FILE_NAME: &str = "sl-daemon.log";

/// Canonical paths for runtime artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    runtime_dir: PathBuf,
    pid_path: PathBuf,
    log_path: PathBuf,
}

impl RuntimePaths {
    /// Derives runtime paths and creates the runtime directory with owner-only
    /// permissions when it does not exist yet.
    pub fn from_config(config: &Config) -> Result<Self, RuntimePathsError> {
        let paths = Self::from_config_readonly(config);
        create_private_dir(&paths.runtime_dir)?;
        Ok(paths)
    }

    /// Derives runtime paths without touching the filesystem.
    #[must_use]
    pub fn from_config_readonly(config: &Config) -> Self {
        let runtime_dir = config
            .runtime_dir()
            .map(|dir| dir.as_std_path().to_path_buf())
            .unwrap_or_else(default_runtime_directory);
        Self {
            pid_path: runtime_dir.join(PID_FILE_NAME),
            log_path: runtime_dir.join(LOG_FILE_NAME),
            runtime_dir,
        }
    }

    /// Directory holding runtime artefacts.
    pub fn runtime_dir(&self) -> &Path {
        self.runtime_dir.as_path()
    }

    /// Path to the PID record.
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Path to the append-only daemon log.
    pub fn log_path(&self) -> &Path {
        self.log_path.as_path()
    }
}

fn create_private_dir(path: &Path) -> Result<(), RuntimePathsError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(path)
        .map_err(|source| RuntimePathsError::RuntimeDirectory {
            path: path.to_path_buf(),
            source,
        })
}

fn default_runtime_directory() -> PathBuf {
    #[cfg(unix)]
    {
        if let Some(mut dir) = runtime_dir() {
            dir.push(RUNTIME_NAMESPACE);
            return dir;
        }
        let mut dir = env::temp_dir();
        dir.push(RUNTIME_NAMESPACE);
        // SAFETY: `geteuid` has no preconditions and cannot fail.
        dir.push(format!("uid-{}", unsafe { geteuid() }));
        dir
    }

    #[cfg(not(unix))]
    {
        let mut dir = env::temp_dir();
        dir.push(RUNTIME_NAMESPACE);
        dir
    }
}

/// Errors raised while deriving runtime paths.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// Creating the runtime directory failed.
    #[error("failed to prepare runtime directory '{path}': {source}")]
    RuntimeDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
