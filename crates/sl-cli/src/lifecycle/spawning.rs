//! Daemon process spawning.
//!
//! The daemon is started in its own session with stdin and stdout piped so the
//! controller can run the startup handshake and then exit without taking the
//! daemon down with it.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::Duration;

use super::error::LifecycleError;
use super::handshake::{HandshakeOutcome, HandshakeReceiver, send_terminate, spawn_reader};

/// Environment variable naming the daemon binary.
pub const DAEMON_BINARY_ENV: &str = "SL_DAEMON_BIN";
const DEFAULT_DAEMON_BINARY: &str = "sl-daemon";
const EXIT_POLL_ATTEMPTS: u32 = 10;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Starts daemon processes.
pub trait DaemonLauncher {
    /// Handle for a daemon that has not yet completed its handshake.
    type Pending: PendingDaemon;

    /// Spawns a detached daemon.
    fn launch(&self) -> Result<Self::Pending, LifecycleError>;
}

/// A spawned daemon whose readiness has not been observed.
pub trait PendingDaemon {
    /// PID assigned by the operating system at spawn time.
    fn child_id(&self) -> u32;

    /// Waits up to `timeout` for the readiness report.
    fn await_ready(&mut self, timeout: Duration) -> HandshakeOutcome;

    /// Sends the abort instruction over the handshake channel.
    fn abort(&mut self) -> Result<(), LifecycleError>;

    /// Exit code of the child when it has already exited.
    fn exit_code(&mut self) -> Option<i32>;
}

/// Launches the real `sl-daemon` binary.
#[derive(Debug, Default, Clone)]
pub struct SystemLauncher {
    binary_override: Option<OsString>,
    arguments: Vec<OsString>,
}

impl SystemLauncher {
    /// Builds a launcher forwarding `arguments` to the daemon.
    #[must_use]
    pub fn new(binary_override: Option<&OsStr>, arguments: &[OsString]) -> Self {
        Self {
            binary_override: binary_override.map(OsString::from),
            arguments: arguments.to_vec(),
        }
    }

    /// Uses `binary` instead of resolving the daemon from the environment.
    #[must_use]
    pub fn with_binary(binary: impl Into<OsString>) -> Self {
        Self {
            binary_override: Some(binary.into()),
            arguments: Vec::new(),
        }
    }
}

impl DaemonLauncher for SystemLauncher {
    type Pending = SpawnedDaemon;

    fn launch(&self) -> Result<SpawnedDaemon, LifecycleError> {
        let binary = resolve_daemon_binary(self.binary_override.as_deref());
        let mut command = Command::new(&binary);
        command
            .args(&self.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        // SAFETY: `setsid` is async-signal-safe and the closure touches no
        // state shared with the parent.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(io::Error::from)
            });
        }
        let mut child = command
            .spawn()
            .map_err(|source| LifecycleError::LaunchDaemon { binary, source })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(LifecycleError::MissingPipe { stream: "stdout" })?;
        let stdin = child
            .stdin
            .take()
            .ok_or(LifecycleError::MissingPipe { stream: "stdin" })?;
        Ok(SpawnedDaemon {
            child,
            stdin: Some(stdin),
            handshake: spawn_reader(stdout),
        })
    }
}

/// Child process plus the controller's ends of the handshake channel.
#[derive(Debug)]
pub struct SpawnedDaemon {
    child: Child,
    stdin: Option<ChildStdin>,
    handshake: HandshakeReceiver,
}

impl PendingDaemon for SpawnedDaemon {
    fn child_id(&self) -> u32 {
        self.child.id()
    }

    fn await_ready(&mut self, timeout: Duration) -> HandshakeOutcome {
        self.handshake.wait(timeout)
    }

    fn abort(&mut self) -> Result<(), LifecycleError> {
        let pid = self.child.id();
        let Some(mut stdin) = self.stdin.take() else {
            return Err(LifecycleError::AbortFailed {
                pid,
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            });
        };
        send_terminate(&mut stdin).map_err(|source| LifecycleError::AbortFailed { pid, source })
    }

    fn exit_code(&mut self) -> Option<i32> {
        for _ in 0..EXIT_POLL_ATTEMPTS {
            match self.child.try_wait() {
                Ok(Some(status)) => return status.code(),
                Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
                Err(_) => return None,
            }
        }
        None
    }
}

fn resolve_daemon_binary(binary_override: Option<&OsStr>) -> OsString {
    binary_override
        .map(OsString::from)
        .or_else(|| env::var_os(DAEMON_BINARY_ENV))
        .unwrap_or_else(|| OsString::from(DEFAULT_DAEMON_BINARY))
}
