use std::fmt;
use std::io;
use std::sync::Arc;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Why the daemon left its serving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// A termination signal arrived.
    Signal(i32),
    /// The controller abandoned the start attempt.
    Aborted,
}

/// Wakes a blocked [`ShutdownSignal::wait`] without a process signal.
#[derive(Clone)]
pub struct AbortHandle {
    trigger: Arc<dyn Fn() + Send + Sync>,
}

impl AbortHandle {
    /// Wraps the action that releases the waiter.
    pub fn new(trigger: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            trigger: Arc::new(trigger),
        }
    }

    /// Releases the waiter with [`ShutdownCause::Aborted`].
    pub fn abort(&self) {
        (self.trigger)();
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("AbortHandle").finish_non_exhaustive()
    }
}

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send {
    /// Returns a handle that ends [`ShutdownSignal::wait`] early.
    fn abort_handle(&self) -> AbortHandle;

    /// Blocks until shutdown should proceed.
    fn wait(&mut self) -> ShutdownCause;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
///
/// Handlers are registered by [`SystemShutdownSignal::install`], so signals
/// delivered before [`ShutdownSignal::wait`] runs are not lost.
pub struct SystemShutdownSignal {
    signals: Signals,
}

impl SystemShutdownSignal {
    /// Registers the termination signal handlers.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self { signals })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn abort_handle(&self) -> AbortHandle {
        let handle = self.signals.handle();
        AbortHandle::new(move || handle.close())
    }

    fn wait(&mut self) -> ShutdownCause {
        match self.signals.forever().next() {
            Some(signal) => {
                info!(
                    target: PROCESS_TARGET,
                    signal,
                    "shutdown signal received"
                );
                ShutdownCause::Signal(signal)
            }
            None => ShutdownCause::Aborted,
        }
    }
}
