//! Daemon side of the private parent/child handshake.
//!
//! Readiness travels to the controller on stdout. The controller may answer
//! on stdin with an abort instruction if it gave up waiting.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use sl_daemon_types::{HandshakeCodecError, HandshakeMessage};

use crate::health::HealthReporter;

use super::PROCESS_TARGET;
use super::shutdown::AbortHandle;

/// Streams connecting the daemon to the controller that spawned it.
pub struct ParentChannel {
    ready: Box<dyn Write + Send>,
    abort: Box<dyn Read + Send>,
}

impl ParentChannel {
    /// Uses stdout for readiness and stdin for abort instructions.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stdin())
    }

    /// Builds a channel from explicit streams.
    pub fn new(ready: impl Write + Send + 'static, abort: impl Read + Send + 'static) -> Self {
        Self {
            ready: Box::new(ready),
            abort: Box::new(abort),
        }
    }

    pub(crate) fn into_parts(self) -> (Box<dyn Write + Send>, Box<dyn Read + Send>) {
        (self.ready, self.abort)
    }
}

/// Errors raised while reporting readiness.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The readiness message could not be encoded.
    #[error(transparent)]
    Encode(#[from] HandshakeCodecError),
    /// Writing to the controller failed.
    #[error("failed to write readiness to the controller: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Outcome of watching the abort stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AbortWatch {
    /// The controller asked the daemon to abort.
    Aborted,
    /// The controller closed the stream without aborting.
    Closed,
}

/// Writes `{"start":<pid>}` and flushes it to the controller.
pub(crate) fn report_ready(writer: &mut dyn Write, pid: u32) -> Result<(), ReadinessError> {
    let line = HandshakeMessage::ready(pid).encode_line()?;
    writer
        .write_all(&line)
        .and_then(|()| writer.flush())
        .map_err(|source| ReadinessError::Write { source })
}

/// Watches `reader` for an abort instruction on a background thread.
pub(crate) fn spawn_abort_watcher(
    reader: Box<dyn Read + Send>,
    abort: AbortHandle,
    reporter: Arc<dyn HealthReporter>,
) -> thread::JoinHandle<AbortWatch> {
    thread::spawn(move || {
        let outcome = watch_for_abort(BufReader::new(reader));
        if outcome == AbortWatch::Aborted {
            reporter.abort_received();
            abort.abort();
        }
        outcome
    })
}

fn watch_for_abort(reader: impl BufRead) -> AbortWatch {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    error = %error,
                    "failed to read from controller"
                );
                return AbortWatch::Closed;
            }
        };
        match HandshakeMessage::decode_line(&line) {
            Ok(message) if message.is_abort() => return AbortWatch::Aborted,
            Ok(message) => {
                debug!(target: PROCESS_TARGET, ?message, "ignoring controller message");
            }
            Err(HandshakeCodecError::Empty) => {}
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    error = %error,
                    "ignoring malformed controller message"
                );
            }
        }
    }
    debug!(target: PROCESS_TARGET, "controller channel closed");
    AbortWatch::Closed
}
