//! Connection handling for the notification relay.

use std::io::{self, Read};
use std::net::TcpStream;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::notifier::Notifier;

use super::LISTENER_TARGET;

/// Bytes requested from the socket per read; each read is one event.
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Trailing bytes dropped from every chunk, normally the sender's `\r\n`.
const TRAILER_BYTES: usize = 2;

/// Handles accepted relay connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}

/// Forwards every chunk read from a connection to the notifier.
pub(crate) struct RelayHandler {
    notifier: Arc<dyn Notifier>,
}

impl RelayHandler {
    pub(crate) fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    fn relay(&self, chunk: &[u8]) {
        let body = notification_body(chunk);
        if let Err(error) = self.notifier.notify(&body) {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "notification failed"
            );
        }
        info!(target: LISTENER_TARGET, "received message.");
    }
}

impl ConnectionHandler for RelayHandler {
    fn handle(&self, mut stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        let mut buffer = vec![0_u8; READ_BUFFER_BYTES];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => self.relay(&buffer[..read]),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "connection read error"
                    );
                    break;
                }
            }
        }
        debug!(target: LISTENER_TARGET, peer = ?peer, "connection closed");
    }
}

/// Strips the trailing terminator from a chunk and decodes it lossily.
pub(crate) fn notification_body(chunk: &[u8]) -> String {
    let end = chunk.len().saturating_sub(TRAILER_BYTES);
    String::from_utf8_lossy(&chunk[..end]).into_owned()
}
