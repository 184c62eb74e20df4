//! Error types for daemon lifecycle operations.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use sl_config::RuntimePathsError;

/// Errors raised while executing lifecycle commands.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The daemon binary could not be executed.
    #[error("failed to spawn sl-daemon binary '{binary:?}': {source}")]
    LaunchDaemon {
        /// Program that was executed.
        binary: OsString,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The child was spawned without one of its handshake pipes.
    #[error("sl-daemon was spawned without a {stream} pipe")]
    MissingPipe {
        /// `stdin` or `stdout`.
        stream: &'static str,
    },
    /// The child exited or closed its stdout before reporting readiness.
    #[error("sl-daemon exited before reporting ready (status: {exit_status:?})")]
    StartupFailed {
        /// Exit code, when it could be collected.
        exit_status: Option<i32>,
    },
    /// No readiness report arrived in time.
    #[error("timed out after {timeout_ms} ms waiting for sl-daemon to report ready")]
    StartupTimeout {
        /// Wait that elapsed.
        timeout_ms: u64,
    },
    /// The abort instruction could not be delivered.
    #[error("failed to send terminate to sl-daemon pid {pid}: {source}")]
    AbortFailed {
        /// Daemon process identifier.
        pid: u32,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The PID file exists but could not be read.
    #[error("failed to read pid file {path:?}: {source}")]
    ReadPid {
        /// PID file location.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The PID file does not hold a process identifier.
    #[error("failed to parse pid file {path:?}: {source}")]
    ParsePid {
        /// PID file location.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::num::ParseIntError,
    },
    /// The PID file could not be written.
    #[error("failed to write pid file {path:?}: {source}")]
    WritePid {
        /// PID file location.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The PID file could not be removed.
    #[error("failed to remove pid file {path:?}: {source}")]
    ClearPid {
        /// PID file location.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The process table lookup failed.
    #[error("failed to query process {pid}: {source}")]
    ProcessQuery {
        /// Daemon process identifier.
        pid: u32,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// SIGTERM could not be delivered.
    #[error("failed to signal sl-daemon pid {pid}: {source}")]
    SignalFailed {
        /// Daemon process identifier.
        pid: u32,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The signalled daemon outlived the shutdown wait.
    #[error("sl-daemon pid {pid} did not exit within {timeout_ms} ms")]
    ShutdownTimeout {
        /// Daemon that was signalled.
        pid: u32,
        /// Wait that elapsed.
        timeout_ms: u64,
    },
    /// The command result could not be written.
    #[error("failed to write lifecycle output: {0}")]
    Io(#[source] io::Error),
    /// The runtime directory could not be prepared.
    #[error(transparent)]
    Paths(#[from] RuntimePathsError),
}
