//! Controller side of the startup handshake.
//!
//! A reader thread owns the child's stdout and resolves a one-shot channel with
//! the first meaningful outcome. The main thread waits on that channel with a
//! deadline, which is the only point where the controller suspends.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use sl_daemon_types::{HandshakeCodecError, HandshakeMessage};
use tracing::debug;

use super::LIFECYCLE_TARGET;

/// Result of waiting for the daemon's readiness report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The daemon reported readiness with its PID.
    Ready(u32),
    /// The channel closed before readiness, usually because the child exited.
    Closed,
    /// The startup window elapsed with no report.
    TimedOut,
}

/// Pending readiness report produced by [`spawn_reader`].
#[derive(Debug)]
pub struct HandshakeReceiver {
    outcome: Receiver<HandshakeOutcome>,
}

impl HandshakeReceiver {
    /// Blocks until the reader resolves or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> HandshakeOutcome {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => HandshakeOutcome::TimedOut,
            Err(RecvTimeoutError::Disconnected) => HandshakeOutcome::Closed,
        }
    }
}

/// Starts a detached thread that reads handshake lines from `reader`.
pub fn spawn_reader<R>(reader: R) -> HandshakeReceiver
where
    R: Read + Send + 'static,
{
    let (sender, outcome) = mpsc::sync_channel(1);
    thread::spawn(move || read_outcome(reader, &sender));
    HandshakeReceiver { outcome }
}

fn read_outcome<R: Read>(reader: R, sender: &SyncSender<HandshakeOutcome>) {
    let outcome = first_ready(BufReader::new(reader));
    // The controller may have stopped waiting already.
    let _ = sender.send(outcome);
}

fn first_ready<R: BufRead>(reader: R) -> HandshakeOutcome {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    error = %error,
                    "handshake channel read failed"
                );
                return HandshakeOutcome::Closed;
            }
        };
        match HandshakeMessage::decode_line(&line) {
            Ok(message) => {
                if let Some(pid) = message.ready_pid() {
                    return HandshakeOutcome::Ready(pid);
                }
            }
            Err(HandshakeCodecError::Empty) => {}
            Err(error) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    error = %error,
                    "ignoring unexpected handshake line"
                );
            }
        }
    }
    HandshakeOutcome::Closed
}

/// Writes the abort instruction to the child's stdin.
///
/// # Errors
///
/// Returns the underlying I/O error when the pipe is closed or the message
/// cannot be encoded.
pub fn send_terminate<W: Write + ?Sized>(writer: &mut W) -> io::Result<()> {
    let line = HandshakeMessage::terminate()
        .encode_line()
        .map_err(io::Error::other)?;
    writer.write_all(&line)?;
    writer.flush()
}
