//! Waiting for a signalled daemon to leave the process table.

use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use super::process_table::ProcessTable;

/// Polls `table` until `pid` is gone or `timeout` elapses.
///
/// A failed query is logged and treated as an exit, matching the fail-open
/// status policy.
///
/// # Errors
///
/// Returns [`LifecycleError::ShutdownTimeout`] when the process is still
/// present at the deadline.
pub(super) fn wait_for_exit<P>(
    table: &P,
    pid: u32,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), LifecycleError>
where
    P: ProcessTable + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        match table.lookup(pid) {
            Ok(None) => return Ok(()),
            Ok(Some(_)) => {}
            Err(error) => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid,
                    error = %error,
                    "process query failed while awaiting exit; assuming sl-daemon exited"
                );
                return Ok(());
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(LifecycleError::ShutdownTimeout {
                pid,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        thread::sleep(poll_interval.min(deadline - now));
    }
}
