//! Configuration loading for `slctl`.
//!
//! Configuration flags must precede the verb. They are split off so the verb
//! parser never sees them, handed to `ortho_config`, and forwarded verbatim to
//! the spawned daemon so both processes agree on the layered configuration.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use sl_config::Config;

use crate::AppError;

/// Flags understood by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `sl_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--relay-endpoint",
    "--runtime-dir",
    "--log-filter",
    "--log-format",
    "--startup-timeout-ms",
    "--shutdown-timeout-ms",
    "--notify-command",
    "--notify-title",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from `args`, whose first element is the program
    /// name.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loader backed by `ortho_config` layering.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

/// Arguments partitioned into configuration flags and the verb tail.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by every leading configuration flag.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by the remaining arguments.
    pub(crate) cli_arguments: Vec<OsString>,
}

impl ConfigArgumentSplit {
    /// Configuration flags without the program name.
    pub(crate) fn forwarded(&self) -> &[OsString] {
        self.config_arguments.get(1..).unwrap_or_default()
    }
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.peek() {
        let FlagAction::Include { needs_value } = classify_flag(argument) else {
            break;
        };
        config_arguments.push((*argument).clone());
        remaining.next();
        if needs_value {
            if let Some(value) = remaining.next() {
                config_arguments.push(value.clone());
            }
        }
    }
    let mut cli_arguments = vec![program.clone()];
    cli_arguments.extend(remaining.cloned());
    ConfigArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}
