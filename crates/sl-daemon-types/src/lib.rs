//! Wire types shared by the `slctl` controller and the `sl-daemon` process.
//!
//! The controller spawns the daemon with piped standard streams and uses them
//! as a private, line-oriented handshake channel. Each line carries exactly one
//! JSON object:
//!
//! - `{"start":<pid>}` travels from the daemon to the controller once the
//!   relay listener is accepting connections.
//! - `{"terminate":true}` travels from the controller to the daemon when the
//!   start attempt is abandoned before readiness was observed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single message exchanged over the parent/child handshake channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandshakeMessage {
    /// Readiness report carrying the daemon's process identifier.
    Ready {
        /// Process identifier of the daemon that bound the relay listener.
        start: u32,
    },
    /// Abort instruction sent by the controller.
    Terminate {
        /// Always `true` on the wire; `false` is tolerated and ignored.
        terminate: bool,
    },
}

impl HandshakeMessage {
    /// Builds the readiness report for `pid`.
    #[must_use]
    pub const fn ready(pid: u32) -> Self {
        Self::Ready { start: pid }
    }

    /// Builds the abort instruction.
    #[must_use]
    pub const fn terminate() -> Self {
        Self::Terminate { terminate: true }
    }

    /// Returns the reported PID when the message is a readiness report.
    #[must_use]
    pub const fn ready_pid(&self) -> Option<u32> {
        match self {
            Self::Ready { start } => Some(*start),
            Self::Terminate { .. } => None,
        }
    }

    /// Returns true when the message instructs the daemon to abort.
    #[must_use]
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Terminate { terminate: true })
    }

    /// Encodes the message as a newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeCodecError::Encode`] when serialisation fails.
    pub fn encode_line(&self) -> Result<Vec<u8>, HandshakeCodecError> {
        let mut line = serde_json::to_vec(self).map_err(HandshakeCodecError::Encode)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decodes one line received from the handshake channel.
    ///
    /// Surrounding whitespace, including the line terminator, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeCodecError::Empty`] for blank lines and
    /// [`HandshakeCodecError::Decode`] for anything that is not a handshake
    /// message.
    pub fn decode_line(line: &str) -> Result<Self, HandshakeCodecError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(HandshakeCodecError::Empty);
        }
        serde_json::from_str(trimmed).map_err(|source| HandshakeCodecError::Decode {
            line: trimmed.to_owned(),
            source,
        })
    }
}

/// Errors raised while encoding or decoding handshake lines.
#[derive(Debug, Error)]
pub enum HandshakeCodecError {
    /// The message could not be serialised.
    #[error("failed to encode handshake message: {0}")]
    Encode(#[source] serde_json::Error),
    /// The line was blank.
    #[error("received an empty handshake line")]
    Empty,
    /// The line was not a recognised handshake message.
    #[error("unrecognised handshake line '{line}': {source}")]
    Decode {
        /// Offending line with surrounding whitespace removed.
        line: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
