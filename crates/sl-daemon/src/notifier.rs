//! Desktop notification delivery.
//!
//! The relay hands each decoded body to a [`Notifier`]. The production
//! implementation shells out to a notification program such as
//! `notify-send`, passing every argument directly rather than through a
//! shell.

use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

use sl_config::Config;

pub(crate) const NOTIFIER_TARGET: &str = "sl_daemon::notifier";

/// Display time, in seconds, requested for each notification.
const EXPIRE_TIME: &str = "20";

/// Raises a desktop notification for a relayed message.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Delivers `body` under the configured title.
    fn notify(&self, body: &str) -> Result<(), NotifyError>;
}

/// Errors raised while invoking the notification program.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The program could not be started.
    #[error("failed to run notification command '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The program ran but reported failure.
    #[error("notification command '{program}' exited with {status}")]
    Status {
        /// Program that reported failure.
        program: String,
        /// Exit status returned by the program.
        status: ExitStatus,
    },
}

/// Notifier that runs `<program> -t 20 <title> <body>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNotifier {
    program: String,
    title: String,
}

impl CommandNotifier {
    /// Builds a notifier for an explicit program and title.
    #[must_use]
    pub fn new(program: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            title: title.into(),
        }
    }

    /// Builds a notifier from the configured command and title.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.notify_command(), config.notify_title())
    }

    fn command(&self, body: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-t", EXPIRE_TIME])
            .arg(&self.title)
            .arg(body)
            // The daemon's stdout is the readiness channel; keep it clean.
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, body: &str) -> Result<(), NotifyError> {
        let status = self
            .command(body)
            .status()
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(
            target: NOTIFIER_TARGET,
            program = %self.program,
            status = %status,
            "notification command finished"
        );
        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::Status {
                program: self.program.clone(),
                status,
            })
        }
    }
}
