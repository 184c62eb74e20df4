//! Lifecycle command types and output abstractions.
//!
//! Defines the payloads and IO wrappers shared across lifecycle commands so the
//! controller can remain agnostic of concrete writers.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::Write;

use sl_config::{Config, RuntimePaths};

use super::LifecycleError;
use crate::cli::Verb;

/// Supported lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Launch the daemon unless one is already running.
    Start,
    /// Terminate the recorded daemon and clear its record.
    Stop,
    /// Report whether the recorded daemon is alive.
    Status,
    /// Stop a running daemon, then start a fresh one.
    Restart,
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => formatter.write_str("start"),
            Self::Stop => formatter.write_str("stop"),
            Self::Status => formatter.write_str("status"),
            Self::Restart => formatter.write_str("restart"),
        }
    }
}

impl From<Verb> for LifecycleCommand {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Start => Self::Start,
            Verb::Stop => Self::Stop,
            Verb::Status => Self::Status,
            Verb::Restart => Self::Restart,
        }
    }
}

/// Environment shared by every lifecycle command.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleContext<'a> {
    /// Layered configuration loaded for this invocation.
    pub config: &'a Config,
    /// Runtime directory, PID file and log locations.
    pub paths: &'a RuntimePaths,
    /// Configuration flags forwarded to the spawned daemon.
    pub config_arguments: &'a [OsString],
    /// Replaces `SL_DAEMON_BIN` resolution when set.
    pub daemon_binary: Option<&'a OsStr>,
}

/// Whether a daemon instance is alive, recomputed on every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    /// A live process matches the recorded PID.
    Running(u32),
    /// No record, or the recorded process is gone.
    Stopped,
}

/// Writer receiving the user-facing result line of each command.
///
/// Diagnostics are not written here; the runner reports errors itself.
pub struct LifecycleOutput<W: Write> {
    /// Destination for result lines, normally the process stdout.
    pub stdout: W,
}

impl<W: Write> LifecycleOutput<W> {
    /// Wraps `stdout`.
    pub const fn new(stdout: W) -> Self {
        Self { stdout }
    }

    /// Writes one newline-terminated line and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Io`] when the writer fails.
    pub fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stdout.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stdout.write_all(b"\n").map_err(LifecycleError::Io)?;
        self.stdout.flush().map_err(LifecycleError::Io)
    }
}
