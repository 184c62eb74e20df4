//! Start, stop, restart and status flows for `sl-daemon`.
//!
//! The controller owns its collaborators so tests can substitute in-memory
//! stores, scripted process tables and fake launchers.

use std::io::Write;
use std::time::Duration;

use sl_config::Config;
use tracing::{info, warn};

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use super::handshake::HandshakeOutcome;
use super::process_table::{NixProcessTable, ProcessTable};
use super::shutdown::wait_for_exit;
use super::spawning::{DaemonLauncher, PendingDaemon, SystemLauncher};
use super::status::resolve_status;
use super::store::{FilePidStore, StateStore};
use super::types::{DaemonStatus, LifecycleCommand, LifecycleContext, LifecycleOutput};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time bounds applied by the lifecycle flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Window in which the daemon must report readiness.
    pub startup: Duration,
    /// Window in which a signalled daemon must exit.
    pub shutdown: Duration,
    /// Interval between process-table polls while stopping.
    pub poll: Duration,
}

impl Timeouts {
    /// Reads the startup and shutdown windows from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            startup: config.startup_timeout(),
            shutdown: config.shutdown_timeout(),
            poll: EXIT_POLL_INTERVAL,
        }
    }
}

/// Lifecycle controller wired to the real filesystem, process table and
/// daemon binary.
pub type SystemLifecycle = Lifecycle<FilePidStore, NixProcessTable, SystemLauncher>;

impl SystemLifecycle {
    /// Builds the production controller for `context`.
    #[must_use]
    pub fn from_context(context: LifecycleContext<'_>) -> Self {
        Lifecycle::new(
            FilePidStore::new(context.paths.pid_path()),
            NixProcessTable,
            SystemLauncher::new(context.daemon_binary, context.config_arguments),
            Timeouts::from_config(context.config),
        )
    }
}

/// Lifecycle controller generic over its collaborators.
#[derive(Debug)]
pub struct Lifecycle<S, P, L> {
    store: S,
    table: P,
    launcher: L,
    timeouts: Timeouts,
}

impl<S, P, L> Lifecycle<S, P, L>
where
    S: StateStore,
    P: ProcessTable,
    L: DaemonLauncher,
{
    /// Assembles a controller from its collaborators.
    pub const fn new(store: S, table: P, launcher: L, timeouts: Timeouts) -> Self {
        Self {
            store,
            table,
            launcher,
            timeouts,
        }
    }

    /// Runs `command`, writing user-facing lines to `output`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`LifecycleError`] raised by the selected flow.
    pub fn handle<W: Write>(
        &self,
        command: LifecycleCommand,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        info!(target: LIFECYCLE_TARGET, %command, "handling lifecycle command");
        match command {
            LifecycleCommand::Start => self.start(output),
            LifecycleCommand::Stop => self.stop(output),
            LifecycleCommand::Status => self.status(output),
            LifecycleCommand::Restart => self.restart(output),
        }
    }

    /// Identity-record store backing this controller.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process table used for liveness checks and signalling.
    pub const fn table(&self) -> &P {
        &self.table
    }

    /// Current liveness of the recorded daemon.
    pub fn resolve(&self) -> DaemonStatus {
        resolve_status(&self.store, &self.table)
    }

    fn start<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        if let DaemonStatus::Running(pid) = self.resolve() {
            info!(target: LIFECYCLE_TARGET, pid, "sl-daemon already running");
            return output.stdout_line(format_args!("sl-daemon is already running."));
        }
        let mut pending = self.launcher.launch()?;
        let child = pending.child_id();
        info!(target: LIFECYCLE_TARGET, pid = child, "spawned sl-daemon; awaiting readiness");
        match pending.await_ready(self.timeouts.startup) {
            HandshakeOutcome::Ready(pid) => self.record_ready(&mut pending, pid, output),
            HandshakeOutcome::TimedOut => {
                if let Err(error) = pending.abort() {
                    warn!(
                        target: LIFECYCLE_TARGET,
                        pid = child,
                        error = %error,
                        "failed to deliver terminate to unconfirmed sl-daemon"
                    );
                }
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid = child,
                    "sl-daemon did not report ready; start aborted"
                );
                Err(LifecycleError::StartupTimeout {
                    timeout_ms: duration_ms(self.timeouts.startup),
                })
            }
            HandshakeOutcome::Closed => {
                let exit_status = pending.exit_code();
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid = child,
                    exit_status = ?exit_status,
                    "sl-daemon exited before reporting ready"
                );
                Err(LifecycleError::StartupFailed { exit_status })
            }
        }
    }

    fn record_ready<D: PendingDaemon, W: Write>(
        &self,
        pending: &mut D,
        pid: u32,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        if let Err(error) = self.store.write(pid) {
            warn!(
                target: LIFECYCLE_TARGET,
                pid,
                error = %error,
                "failed to record sl-daemon pid; terminating the new instance"
            );
            if let Err(abort_error) = pending.abort() {
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid,
                    error = %abort_error,
                    "failed to deliver terminate to unrecorded sl-daemon"
                );
            }
            return Err(error);
        }
        info!(target: LIFECYCLE_TARGET, pid, "sl-daemon started");
        output.stdout_line(format_args!("Started sl-daemon with PID: {pid}"))
    }

    fn stop<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        let DaemonStatus::Running(pid) = self.resolve() else {
            return output.stdout_line(format_args!("sl-daemon is not running."));
        };
        self.table.terminate(pid).inspect_err(|error| {
            warn!(
                target: LIFECYCLE_TARGET,
                pid,
                error = %error,
                "failed to signal sl-daemon"
            );
        })?;
        info!(target: LIFECYCLE_TARGET, pid, "sent SIGTERM to sl-daemon");
        wait_for_exit(
            &self.table,
            pid,
            self.timeouts.shutdown,
            self.timeouts.poll,
        )?;
        self.store.clear()?;
        info!(target: LIFECYCLE_TARGET, pid, "sl-daemon stopped");
        output.stdout_line(format_args!("sl-daemon has been stopped."))
    }

    fn restart<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        if let DaemonStatus::Running(_) = self.resolve() {
            self.stop(output)?;
        }
        self.start(output)
    }

    fn status<W: Write>(
        &self,
        output: &mut LifecycleOutput<W>,
    ) -> Result<(), LifecycleError> {
        match self.resolve() {
            DaemonStatus::Running(pid) => {
                output.stdout_line(format_args!("sl-daemon is running with pid: {pid}"))
            }
            DaemonStatus::Stopped => output.stdout_line(format_args!("sl-daemon is stopped...")),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
