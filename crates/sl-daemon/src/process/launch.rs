//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{Daemon, SystemConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::notifier::{CommandNotifier, Notifier};
use crate::transport::{RelayHandler, RelayListener};

use super::PROCESS_TARGET;
use super::channel::{ParentChannel, report_ready, spawn_abort_watcher};
use super::errors::LaunchError;
use super::shutdown::{ShutdownCause, ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run a bootstrapped daemon.
pub(crate) struct LaunchPlan<S> {
    pub(crate) daemon: Daemon,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) shutdown: S,
    pub(crate) channel: ParentChannel,
}

/// Runs the daemon using the production collaborators.
///
/// Returns once a termination signal arrives or the controller aborts the
/// start attempt, after the relay listener has been stopped.
pub fn run_daemon() -> Result<ShutdownCause, LaunchError> {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let daemon = bootstrap_with(&SystemConfigLoader, reporter)?;
    let shutdown = SystemShutdownSignal::install()?;
    let notifier = Arc::new(CommandNotifier::from_config(daemon.config()));
    run_daemon_with(LaunchPlan {
        daemon,
        notifier,
        shutdown,
        channel: ParentChannel::stdio(),
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<S>(plan: LaunchPlan<S>) -> Result<ShutdownCause, LaunchError>
where
    S: ShutdownSignal,
{
    let LaunchPlan {
        daemon,
        notifier,
        mut shutdown,
        channel,
    } = plan;
    let reporter = Arc::clone(daemon.reporter());
    let (mut ready, abort) = channel.into_parts();

    info!(
        target: PROCESS_TARGET,
        endpoint = %daemon.config().relay_endpoint(),
        "starting daemon runtime"
    );
    let listener = RelayListener::bind(daemon.config().relay_endpoint())?;
    reporter.listener_bound(listener.local_addr());
    let listener_handle = listener.start(Arc::new(RelayHandler::new(notifier)))?;

    let pid = std::process::id();
    if let Err(error) = report_ready(&mut ready, pid) {
        listener_handle.shutdown();
        listener_handle.join()?;
        return Err(error.into());
    }
    reporter.readiness_reported(pid);

    // Detached: the watcher blocks on the controller stream until it closes.
    let _watcher = spawn_abort_watcher(abort, shutdown.abort_handle(), Arc::clone(&reporter));

    let cause = shutdown.wait();
    info!(
        target: PROCESS_TARGET,
        ?cause,
        "stopping relay listener"
    );
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(cause)
}
