//! Built-in configuration defaults shared by the controller and the daemon.

use crate::endpoint::RelayEndpoint;
use crate::logging::LogFormat;

/// Host the notification relay binds when no override is supplied.
pub const DEFAULT_RELAY_HOST: &str = "127.0.0.1";

/// TCP port the notification relay listens on by default.
pub const DEFAULT_RELAY_PORT: u16 = 1337;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Milliseconds the controller waits for the daemon's readiness report.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 5_000;

/// Milliseconds the controller waits for a signalled daemon to exit.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;

/// Desktop notification program invoked for each relayed message.
pub const DEFAULT_NOTIFY_COMMAND: &str = "notify-send";

/// Title attached to every desktop notification.
pub const DEFAULT_NOTIFY_TITLE: &str = "sl-daemon received a message";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Loopback endpoint the relay listens on out of the box.
pub fn default_relay_endpoint() -> RelayEndpoint {
    RelayEndpoint::new(DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT)
}

pub(crate) fn default_startup_timeout_ms() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_MS
}

pub(crate) fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

pub(crate) fn default_notify_command() -> String {
    DEFAULT_NOTIFY_COMMAND.to_string()
}

pub(crate) fn default_notify_title() -> String {
    DEFAULT_NOTIFY_TITLE.to_string()
}
