//! Notification relay daemon supervised by `slctl`.
//!
//! The daemon binds a loopback TCP endpoint and forwards every chunk it
//! receives to the desktop notification command configured through
//! [`sl_config`]. Its launch sequence is:
//!
//! 1. load configuration, prepare the runtime directory and install the
//!    file-backed subscriber;
//! 2. register termination signal handlers;
//! 3. bind the relay listener and start accepting connections;
//! 4. report `{"start":<pid>}` to the controller on stdout;
//! 5. serve until a termination signal arrives or the controller sends
//!    `{"terminate":true}` on stdin.
//!
//! Health reporting hooks emit structured telemetry at each stage so the
//! daemon log explains why a start attempt did not complete.

mod bootstrap;
mod health;
mod notifier;
mod process;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use notifier::{CommandNotifier, Notifier, NotifyError};
pub use process::{
    AbortHandle, LaunchError, ParentChannel, ReadinessError, ShutdownCause, ShutdownError,
    ShutdownSignal, SystemShutdownSignal, run_daemon,
};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
