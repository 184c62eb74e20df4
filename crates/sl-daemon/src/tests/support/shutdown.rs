//! Channel-backed [`ShutdownSignal`] that tests trigger explicitly.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::process::{AbortHandle, ShutdownCause, ShutdownSignal};

pub struct ManualShutdown {
    sender: Sender<ShutdownCause>,
    receiver: Receiver<ShutdownCause>,
}

impl ManualShutdown {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Sender standing in for process signal delivery.
    pub fn trigger(&self) -> Sender<ShutdownCause> {
        self.sender.clone()
    }
}

impl ShutdownSignal for ManualShutdown {
    fn abort_handle(&self) -> AbortHandle {
        let sender = self.sender.clone();
        AbortHandle::new(move || {
            let _ = sender.send(ShutdownCause::Aborted);
        })
    }

    fn wait(&mut self) -> ShutdownCause {
        self.receiver.recv().unwrap_or(ShutdownCause::Aborted)
    }
}
