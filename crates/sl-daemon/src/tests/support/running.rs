//! In-process daemon run wired to socket pairs instead of stdio.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use signal_hook::consts::signal::SIGTERM;
use tempfile::TempDir;

use sl_config::{Config, RelayEndpoint};
use sl_daemon_types::HandshakeMessage;

use crate::bootstrap::{StaticConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::notifier::test_support::RecordingNotifier;
use crate::process::launch::{LaunchPlan, run_daemon_with};
use crate::process::{LaunchError, ParentChannel, ShutdownCause};

use super::{ManualShutdown, RecordingHealthReporter};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

type RunResult = Result<ShutdownCause, LaunchError>;

/// Daemon running on a background thread with the controller's ends of the
/// handshake channel held by the test.
pub struct RunningDaemon {
    pub reporter: Arc<RecordingHealthReporter>,
    pub notifier: Arc<RecordingNotifier>,
    readiness: BufReader<UnixStream>,
    controller: Option<UnixStream>,
    trigger: Sender<ShutdownCause>,
    thread: Option<JoinHandle<RunResult>>,
    outcome: Option<RunResult>,
    _runtime: TempDir,
}

/// Loopback configuration with an ephemeral port and a private runtime dir.
pub fn test_config(runtime: &TempDir) -> Config {
    let mut config = Config::default();
    config.relay_endpoint = RelayEndpoint::new("127.0.0.1", 0);
    config.runtime_dir = Some(
        Utf8PathBuf::from_path_buf(runtime.path().to_path_buf()).expect("utf-8 runtime path"),
    );
    config
}

impl RunningDaemon {
    pub fn spawn() -> Self {
        let runtime = TempDir::new().expect("create runtime dir");
        Self::spawn_with(test_config(&runtime), runtime)
    }

    pub fn spawn_with(config: Config, runtime: TempDir) -> Self {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let dyn_reporter: Arc<dyn HealthReporter> = reporter.clone();
        let daemon = bootstrap_with(&StaticConfigLoader::new(config), dyn_reporter)
            .expect("bootstrap daemon");

        let (ready_daemon, ready_controller) = UnixStream::pair().expect("readiness pair");
        let (abort_daemon, abort_controller) = UnixStream::pair().expect("abort pair");
        ready_controller
            .set_read_timeout(Some(WAIT_TIMEOUT))
            .expect("set readiness timeout");

        let shutdown = ManualShutdown::new();
        let trigger = shutdown.trigger();
        let notifier = Arc::new(RecordingNotifier::default());
        let plan = LaunchPlan {
            daemon,
            notifier: notifier.clone(),
            shutdown,
            channel: ParentChannel::new(ready_daemon, abort_daemon),
        };
        let thread = thread::spawn(move || run_daemon_with(plan));

        Self {
            reporter,
            notifier,
            readiness: BufReader::new(ready_controller),
            controller: Some(abort_controller),
            trigger,
            thread: Some(thread),
            outcome: None,
            _runtime: runtime,
        }
    }

    /// Reads the next handshake line; `None` when the daemon closed stdout.
    pub fn read_readiness(&mut self) -> Option<HandshakeMessage> {
        let mut line = String::new();
        let read = self.readiness.read_line(&mut line).expect("read readiness");
        if read == 0 {
            return None;
        }
        Some(HandshakeMessage::decode_line(&line).expect("decode readiness"))
    }

    pub fn relay_addr(&self) -> SocketAddr {
        self.reporter.bound_addr().expect("listener should be bound")
    }

    pub fn send(&self, payload: &[u8]) {
        let mut client = TcpStream::connect(self.relay_addr()).expect("connect to relay");
        client.write_all(payload).expect("write payload");
        client.shutdown(Shutdown::Write).expect("half-close client");
    }

    pub fn wait_for_bodies(&self, expected: usize) -> Vec<String> {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let bodies = self.notifier.bodies();
            if bodies.len() >= expected || Instant::now() >= deadline {
                return bodies;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn send_terminate(&mut self) {
        let line = HandshakeMessage::terminate()
            .encode_line()
            .expect("encode terminate");
        self.controller
            .as_mut()
            .expect("controller channel open")
            .write_all(&line)
            .expect("write terminate");
    }

    pub fn close_controller(&mut self) {
        drop(self.controller.take());
    }

    pub fn signal(&self, signal: i32) {
        let _ = self.trigger.send(ShutdownCause::Signal(signal));
    }

    /// Waits for the run to finish and returns its outcome.
    pub fn outcome(&mut self) -> &RunResult {
        if self.outcome.is_none() {
            let handle = self.thread.take().expect("daemon thread present");
            let deadline = Instant::now() + WAIT_TIMEOUT;
            while !handle.is_finished() {
                assert!(Instant::now() < deadline, "daemon did not stop in time");
                thread::sleep(POLL_INTERVAL);
            }
            self.outcome = Some(handle.join().expect("daemon thread panicked"));
        }
        self.outcome.as_ref().expect("outcome recorded")
    }
}

impl Drop for RunningDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = self.trigger.send(ShutdownCause::Signal(SIGTERM));
            let _ = handle.join();
        }
    }
}
