//! Test support utilities for controller behavioural coverage.
//!
//! Supplies a world that drives the runner against in-memory lifecycle
//! collaborators so step definitions and unit tests stay focused on their
//! assertions.

use std::cell::RefCell;
use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use rstest::fixture;
use sl_config::Config;
use tempfile::TempDir;

use crate::config::ConfigLoader;
use crate::lifecycle::test_support::{FakeLauncher, FakeProcessTable, MemoryStore};
use crate::lifecycle::{Lifecycle, Timeouts};
use crate::{AppError, CliRunner, IoStreams};

pub(super) type TestLifecycle = Lifecycle<MemoryStore, FakeProcessTable, FakeLauncher>;

/// A config loader that returns a fixed configuration for tests.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Builds a configuration whose runtime directory lives in `dir`.
pub(super) fn config_in(dir: &TempDir) -> Config {
    let runtime_dir = Utf8PathBuf::from_path_buf(dir.path().join("runtime"))
        .unwrap_or_else(|path| panic!("temp path {} is not UTF-8", path.display()));
    Config {
        runtime_dir: Some(runtime_dir),
        ..Config::default()
    }
}

pub(super) fn timeouts() -> Timeouts {
    Timeouts {
        startup: Duration::from_millis(5000),
        shutdown: Duration::from_millis(100),
        poll: Duration::from_millis(1),
    }
}

pub(super) fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from("slctl")];
    args.extend(
        command
            .split_whitespace()
            .map(|token| OsString::from(token.trim_matches('"'))),
    );
    args
}

/// Test world holding scripted collaborators and captured output.
pub(super) struct TestWorld {
    temp_dir: TempDir,
    store: MemoryStore,
    table: FakeProcessTable,
    launcher: FakeLauncher,
    lifecycle: Option<TestLifecycle>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("create temp dir")?,
            store: MemoryStore::empty(),
            table: FakeProcessTable::default(),
            launcher: FakeLauncher::ready(4242),
            lifecycle: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        })
    }

    pub fn daemon_running(&mut self, pid: u32) {
        self.store = MemoryStore::with_pid(pid);
        self.table = FakeProcessTable::with_live([pid]);
    }

    pub fn stale_record(&mut self, pid: u32) {
        self.store = MemoryStore::with_pid(pid);
        self.table = FakeProcessTable::default();
    }

    pub fn script_launcher(&mut self, launcher: FakeLauncher) {
        self.launcher = launcher;
    }

    pub fn run(&mut self, command: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let lifecycle = self.lifecycle.take().unwrap_or_else(|| {
            Lifecycle::new(
                std::mem::take(&mut self.store),
                std::mem::take(&mut self.table),
                self.launcher.clone(),
                timeouts(),
            )
        });
        let loader = StaticConfigLoader::new(config_in(&self.temp_dir));
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        let exit = CliRunner::new(&mut io, &loader).run_with_handler(
            build_args(command),
            |verb, _context, output| lifecycle.handle(verb, output),
        );
        self.exit_code = Some(exit);
        self.lifecycle = Some(lifecycle);
    }

    pub fn lifecycle(&self) -> Result<&TestLifecycle> {
        self.lifecycle
            .as_ref()
            .context("no command has been run yet")
    }

    pub const fn launcher(&self) -> &FakeLauncher {
        &self.launcher
    }

    pub fn stdout_text(&self) -> Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout is not UTF-8")
    }

    pub fn stderr_text(&self) -> Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr is not UTF-8")
    }

    pub fn assert_exit(&self, expected: ExitCode) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(exit == expected, "expected {expected:?}, got {exit:?}");
        Ok(())
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new().expect("failed to build test world"))
}
