//! Test harness utilities shared by the daemon suites.

mod reporter;
pub mod running;
mod shutdown;

pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use running::RunningDaemon;
pub use shutdown::ManualShutdown;
