//! Resolution of the daemon's liveness from the identity record.

use tracing::warn;

use super::LIFECYCLE_TARGET;
use super::process_table::ProcessTable;
use super::store::StateStore;
use super::types::DaemonStatus;

/// Decides whether the recorded daemon is alive.
///
/// Resolution fails open: an unreadable record or a failed process query is
/// logged and reported as [`DaemonStatus::Stopped`] so a corrupt record never
/// blocks a later start.
pub fn resolve_status<S, P>(store: &S, table: &P) -> DaemonStatus
where
    S: StateStore + ?Sized,
    P: ProcessTable + ?Sized,
{
    let pid = match store.read() {
        Ok(Some(pid)) => pid,
        Ok(None) => return DaemonStatus::Stopped,
        Err(error) => {
            warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "identity record unreadable; treating sl-daemon as stopped"
            );
            return DaemonStatus::Stopped;
        }
    };
    match table.lookup(pid) {
        Ok(Some(found)) => DaemonStatus::Running(found),
        Ok(None) => DaemonStatus::Stopped,
        Err(error) => {
            warn!(
                target: LIFECYCLE_TARGET,
                pid,
                error = %error,
                "process query failed; treating sl-daemon as stopped"
            );
            DaemonStatus::Stopped
        }
    }
}
