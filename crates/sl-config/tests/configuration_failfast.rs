use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use sl_config::Config;
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = std::env::var_os(key);
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

#[test]
fn malformed_config_file_fails_loading() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("sl-daemon.toml");
    fs::write(&path, "startup_timeout_ms = not_a_number\n").expect("write malformed config");

    let _env = EnvOverride::set_var("SL_DAEMON_CONFIG_PATH", path.as_os_str());

    let error = Config::load_from_iter([OsString::from("slctl")])
        .expect_err("loading must fail");
    assert!(!error.to_string().is_empty());
}

#[test]
fn invalid_relay_endpoint_fails_loading() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("sl-daemon.toml");
    fs::write(&path, "relay_endpoint = \"unix:///tmp/relay.sock\"\n")
        .expect("write config with unsupported endpoint");

    let _env = EnvOverride::set_var("SL_DAEMON_CONFIG_PATH", path.as_os_str());

    let error = Config::load_from_iter([OsString::from("slctl")])
        .expect_err("unix endpoints are not supported");
    assert!(
        error.to_string().contains("unsupported relay scheme"),
        "unexpected error: {error}"
    );
}
