//! Process-table queries and signal delivery by PID.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use super::error::LifecycleError;

/// Read and signal access to the operating system's process table.
pub trait ProcessTable {
    /// Returns `Some(pid)` when a live process has that identifier.
    fn lookup(&self, pid: u32) -> Result<Option<u32>, LifecycleError>;

    /// Asks the process to terminate gracefully.
    fn terminate(&self, pid: u32) -> Result<(), LifecycleError>;
}

/// Process table backed by `kill(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixProcessTable;

impl ProcessTable for NixProcessTable {
    fn lookup(&self, pid: u32) -> Result<Option<u32>, LifecycleError> {
        let Some(target) = to_pid(pid) else {
            return Ok(None);
        };
        match kill(target, None) {
            Ok(()) | Err(Errno::EPERM) if !is_zombie(pid) => Ok(Some(pid)),
            Ok(()) | Err(Errno::EPERM) => Ok(None),
            Err(Errno::ESRCH) => Ok(None),
            Err(errno) => Err(LifecycleError::ProcessQuery {
                pid,
                source: io::Error::from(errno),
            }),
        }
    }

    fn terminate(&self, pid: u32) -> Result<(), LifecycleError> {
        let Some(target) = to_pid(pid) else {
            return Err(LifecycleError::SignalFailed {
                pid,
                source: io::Error::from(Errno::ESRCH),
            });
        };
        kill(target, Signal::SIGTERM).map_err(|errno| LifecycleError::SignalFailed {
            pid,
            source: io::Error::from(errno),
        })
    }
}

/// Rejects PIDs that would address a process group or every process.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

/// Exited but unreaped processes still accept signal probes.
#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    stat.rsplit_once(')')
        .and_then(|(_, fields)| fields.trim_start().chars().next())
        .is_some_and(|state| state == 'Z')
}

#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: u32) -> bool {
    false
}
