//! Lifecycle management for `sl-daemon`.
//!
//! The flows are split into focused submodules:
//! - [`types`] defines the command models and output helpers.
//! - [`error`] captures the error surface exposed to the CLI.
//! - [`store`] persists the daemon identity record.
//! - [`process_table`] queries and signals processes by PID.
//! - [`handshake`] runs the controller side of the readiness exchange.
//! - [`spawning`] starts the daemon in its own session.
//! - [`status`] decides whether the recorded daemon is alive.
//! - [`shutdown`] waits for a signalled daemon to exit.
//! - [`controller`] composes the start, stop, restart and status flows.

mod controller;
mod error;
mod handshake;
mod process_table;
mod shutdown;
mod spawning;
mod status;
mod store;
#[cfg(test)]
pub(crate) mod test_support;
mod types;

pub(crate) const LIFECYCLE_TARGET: &str = "sl_cli::lifecycle";

pub use controller::{Lifecycle, SystemLifecycle, Timeouts};
pub use error::LifecycleError;
pub use handshake::HandshakeOutcome;
pub use process_table::{NixProcessTable, ProcessTable};
pub use spawning::{DAEMON_BINARY_ENV, DaemonLauncher, PendingDaemon, SpawnedDaemon, SystemLauncher};
pub use store::{FilePidStore, StateStore};
pub use types::{DaemonStatus, LifecycleCommand, LifecycleContext, LifecycleOutput};
