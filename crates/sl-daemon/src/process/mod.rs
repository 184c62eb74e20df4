pub(crate) mod channel;
mod errors;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use channel::{ParentChannel, ReadinessError};
pub use errors::LaunchError;
pub use launch::run_daemon;
pub use shutdown::{AbortHandle, ShutdownCause, ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = "sl_daemon::process";
