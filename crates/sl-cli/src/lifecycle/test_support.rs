//! In-memory lifecycle collaborators for unit and behaviour tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use super::error::LifecycleError;
use super::handshake::HandshakeOutcome;
use super::process_table::ProcessTable;
use super::spawning::{DaemonLauncher, PendingDaemon};
use super::store::StateStore;

fn memory_path() -> PathBuf {
    PathBuf::from("memory://sl-daemon.pid")
}

/// Identity record held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    current: RefCell<Option<u32>>,
    writes: RefCell<Vec<u32>>,
    clears: Cell<usize>,
    fail_read: bool,
    fail_write: bool,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pid(pid: u32) -> Self {
        Self {
            current: RefCell::new(Some(pid)),
            ..Self::default()
        }
    }

    pub fn failing_read() -> Self {
        Self {
            fail_read: true,
            ..Self::default()
        }
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    pub fn current(&self) -> Option<u32> {
        *self.current.borrow()
    }

    pub fn writes(&self) -> Vec<u32> {
        self.writes.borrow().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.get()
    }
}

impl StateStore for MemoryStore {
    fn read(&self) -> Result<Option<u32>, LifecycleError> {
        if self.fail_read {
            return Err(LifecycleError::ReadPid {
                path: memory_path(),
                source: io::Error::other("record unreadable"),
            });
        }
        Ok(self.current())
    }

    fn write(&self, pid: u32) -> Result<(), LifecycleError> {
        if self.fail_write {
            return Err(LifecycleError::WritePid {
                path: memory_path(),
                source: io::Error::other("disk full"),
            });
        }
        self.writes.borrow_mut().push(pid);
        *self.current.borrow_mut() = Some(pid);
        Ok(())
    }

    fn clear(&self) -> Result<(), LifecycleError> {
        self.clears.set(self.clears.get() + 1);
        *self.current.borrow_mut() = None;
        Ok(())
    }
}

/// Process table with scripted liveness.
///
/// Terminated processes leave the table immediately unless
/// [`FakeProcessTable::ignoring_terminate`] is set.
#[derive(Debug, Default)]
pub struct FakeProcessTable {
    live: RefCell<BTreeSet<u32>>,
    exit_after: RefCell<HashMap<u32, usize>>,
    lookups: Cell<usize>,
    signalled: RefCell<Vec<u32>>,
    fail_lookup: bool,
    fail_signal: bool,
    ignore_terminate: bool,
}

impl FakeProcessTable {
    pub fn with_live(pids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            live: RefCell::new(pids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn failing_lookup() -> Self {
        Self {
            fail_lookup: true,
            ..Self::default()
        }
    }

    /// Removes `pid` after it has been looked up `lookups` times.
    pub fn exiting_after(self, pid: u32, lookups: usize) -> Self {
        self.exit_after.borrow_mut().insert(pid, lookups);
        self
    }

    pub fn ignoring_terminate(mut self) -> Self {
        self.ignore_terminate = true;
        self
    }

    pub fn failing_signal(mut self) -> Self {
        self.fail_signal = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    pub fn signalled(&self) -> Vec<u32> {
        self.signalled.borrow().clone()
    }

    pub fn is_live(&self, pid: u32) -> bool {
        self.live.borrow().contains(&pid)
    }
}

impl ProcessTable for FakeProcessTable {
    fn lookup(&self, pid: u32) -> Result<Option<u32>, LifecycleError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail_lookup {
            return Err(LifecycleError::ProcessQuery {
                pid,
                source: io::Error::other("process table unavailable"),
            });
        }
        if let Some(remaining) = self.exit_after.borrow_mut().get_mut(&pid) {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.live.borrow_mut().remove(&pid);
            }
        }
        Ok(self.is_live(pid).then_some(pid))
    }

    fn terminate(&self, pid: u32) -> Result<(), LifecycleError> {
        if self.fail_signal {
            return Err(LifecycleError::SignalFailed {
                pid,
                source: io::Error::from_raw_os_error(3),
            });
        }
        self.signalled.borrow_mut().push(pid);
        if !self.ignore_terminate {
            self.live.borrow_mut().remove(&pid);
        }
        Ok(())
    }
}

/// Observations shared between a [`FakeLauncher`] and its pending daemons.
#[derive(Debug, Default)]
pub struct LaunchLog {
    pub launches: usize,
    pub aborts: usize,
    pub waits: Vec<Duration>,
}

/// Launcher whose children resolve the handshake with a scripted outcome.
#[derive(Debug, Clone)]
pub struct FakeLauncher {
    child_pid: u32,
    outcome: HandshakeOutcome,
    exit_code: Option<i32>,
    fail_launch: bool,
    fail_abort: bool,
    log: Rc<RefCell<LaunchLog>>,
}

impl FakeLauncher {
    pub fn ready(pid: u32) -> Self {
        Self::resolving(pid, HandshakeOutcome::Ready(pid))
    }

    pub fn resolving(child_pid: u32, outcome: HandshakeOutcome) -> Self {
        Self {
            child_pid,
            outcome,
            exit_code: None,
            fail_launch: false,
            fail_abort: false,
            log: Rc::default(),
        }
    }

    pub fn hung(child_pid: u32) -> Self {
        Self::resolving(child_pid, HandshakeOutcome::TimedOut)
    }

    pub fn exiting(child_pid: u32, exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::resolving(child_pid, HandshakeOutcome::Closed)
        }
    }

    pub fn unlaunchable() -> Self {
        Self {
            fail_launch: true,
            ..Self::hung(0)
        }
    }

    pub fn failing_abort(mut self) -> Self {
        self.fail_abort = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.log.borrow().launches
    }

    pub fn aborts(&self) -> usize {
        self.log.borrow().aborts
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.log.borrow().waits.clone()
    }
}

impl DaemonLauncher for FakeLauncher {
    type Pending = FakePending;

    fn launch(&self) -> Result<FakePending, LifecycleError> {
        if self.fail_launch {
            return Err(LifecycleError::LaunchDaemon {
                binary: OsString::from("fake-sl-daemon"),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        self.log.borrow_mut().launches += 1;
        Ok(FakePending {
            launcher: self.clone(),
        })
    }
}

/// Pending daemon produced by [`FakeLauncher`].
#[derive(Debug)]
pub struct FakePending {
    launcher: FakeLauncher,
}

impl PendingDaemon for FakePending {
    fn child_id(&self) -> u32 {
        self.launcher.child_pid
    }

    fn await_ready(&mut self, timeout: Duration) -> HandshakeOutcome {
        self.launcher.log.borrow_mut().waits.push(timeout);
        self.launcher.outcome
    }

    fn abort(&mut self) -> Result<(), LifecycleError> {
        self.launcher.log.borrow_mut().aborts += 1;
        if self.launcher.fail_abort {
            return Err(LifecycleError::AbortFailed {
                pid: self.launcher.child_pid,
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            });
        }
        Ok(())
    }

    fn exit_code(&mut self) -> Option<i32> {
        self.launcher.exit_code
    }
}
