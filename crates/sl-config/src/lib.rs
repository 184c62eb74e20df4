//! Shared configuration for the `slctl` controller and the `sl-daemon`
//! notification relay.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a
//! configuration file, then `SL_DAEMON_*` environment variables.

mod defaults;
mod endpoint;
pub mod logging;
mod runtime;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_NOTIFY_COMMAND, DEFAULT_NOTIFY_TITLE, DEFAULT_RELAY_HOST,
    DEFAULT_RELAY_PORT, DEFAULT_SHUTDOWN_TIMEOUT_MS, DEFAULT_STARTUP_TIMEOUT_MS,
    default_log_filter, default_log_format, default_relay_endpoint,
};
pub use endpoint::{EndpointParseError, RelayEndpoint};
pub use logging::{LogFormat, LogFormatParseError};
pub use runtime::{RuntimePaths, RuntimePathsError};

use defaults::{
    default_log_filter_string, default_notify_command, default_notify_title,
    default_shutdown_timeout_ms, default_startup_timeout_ms,
};

/// Configuration shared by the controller and the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SL_DAEMON")]
pub struct Config {
    /// Address the notification relay listens on.
    #[serde(default = "default_relay_endpoint")]
    #[ortho_config(default = default_relay_endpoint())]
    pub relay_endpoint: RelayEndpoint,
    /// Directory holding the PID record and the daemon log.
    #[serde(default)]
    pub runtime_dir: Option<Utf8PathBuf>,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log entries.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Milliseconds to wait for the daemon's readiness report.
    #[serde(default = "default_startup_timeout_ms")]
    #[ortho_config(default = default_startup_timeout_ms())]
    pub startup_timeout_ms: u64,
    /// Milliseconds to wait for a signalled daemon to exit.
    #[serde(default = "default_shutdown_timeout_ms")]
    #[ortho_config(default = default_shutdown_timeout_ms())]
    pub shutdown_timeout_ms: u64,
    /// Program invoked to raise a desktop notification.
    #[serde(default = "default_notify_command")]
    #[ortho_config(default = default_notify_command())]
    pub notify_command: String,
    /// Title attached to every notification.
    #[serde(default = "default_notify_title")]
    #[ortho_config(default = default_notify_title())]
    pub notify_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_endpoint: default_relay_endpoint(),
            runtime_dir: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            startup_timeout_ms: default_startup_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            notify_command: default_notify_command(),
            notify_title: default_notify_title(),
        }
    }
}

impl Config {
    /// Address the notification relay listens on.
    #[must_use]
    pub fn relay_endpoint(&self) -> &RelayEndpoint {
        &self.relay_endpoint
    }

    /// Explicit runtime directory, when configured.
    #[must_use]
    pub fn runtime_dir(&self) -> Option<&Utf8PathBuf> {
        self.runtime_dir.as_ref()
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log entries.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Readiness wait applied by `start`.
    #[must_use]
    pub fn startup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.startup_timeout_ms)
    }

    /// Exit wait applied by `stop`.
    #[must_use]
    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Program invoked to raise a desktop notification.
    #[must_use]
    pub fn notify_command(&self) -> &str {
        &self.notify_command
    }

    /// Title attached to every notification.
    #[must_use]
    pub fn notify_title(&self) -> &str {
        &self.notify_title
    }
}
