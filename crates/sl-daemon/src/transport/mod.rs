//! TCP relay listener for notification payloads.
//!
//! The transport module binds the configured loopback endpoint and accepts
//! connections in a background thread, handing each one to its own handler
//! thread.

mod errors;
mod handler;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, RelayHandler};
pub(crate) use self::listener::RelayListener;

pub(crate) const LISTENER_TARGET: &str = "sl_daemon::transport";
