//! Controller runtime for the `sl-daemon` notification relay.
//!
//! The runner parses the lifecycle verb, loads the layered configuration,
//! installs file logging and drives the lifecycle controller. Configuration
//! loading, the daemon binary and the lifecycle handler can all be substituted
//! so tests exercise the runner without spawning real processes.

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use sl_config::{Config, RuntimePaths, logging};
use tracing::error;

mod cli;
mod config;
mod errors;
pub mod lifecycle;

use cli::{Cli, USAGE};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;
use lifecycle::{
    LIFECYCLE_TARGET, LifecycleCommand, LifecycleContext, LifecycleError, LifecycleOutput,
    SystemLifecycle,
};

pub use lifecycle::DAEMON_BINARY_ENV;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
    daemon_binary: Option<&'a OsStr>,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self {
            io,
            loader,
            daemon_binary: None,
        }
    }

    #[cfg(test)]
    const fn with_daemon_binary(mut self, daemon_binary: Option<&'a OsStr>) -> Self {
        self.daemon_binary = daemon_binary;
        self
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        self.run_with_handler(args, |command, context, output| {
            SystemLifecycle::from_context(context).handle(command, output)
        })
    }

    fn run_with_handler<I, F>(&mut self, args: I, mut handler: F) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        F: FnMut(
            LifecycleCommand,
            LifecycleContext<'_>,
            &mut LifecycleOutput<&mut W>,
        ) -> Result<(), LifecycleError>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let command = match Cli::try_parse_from(split.cli_arguments.iter().cloned()) {
            Ok(Cli {
                command: Some(verb),
            }) => LifecycleCommand::from(verb),
            Ok(Cli { command: None }) => return self.usage(),
            Err(parse_error)
                if matches!(
                    parse_error.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                return match write!(self.io.stdout, "{parse_error}") {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                };
            }
            Err(_) => return self.usage(),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                let paths = RuntimePaths::from_config(&config).map_err(LifecycleError::from)?;
                self.install_logging(&config, &paths);
                let context = LifecycleContext {
                    config: &config,
                    paths: &paths,
                    config_arguments: split.forwarded(),
                    daemon_binary: self.daemon_binary,
                };
                let mut output = LifecycleOutput::new(&mut *self.io.stdout);
                handler(command, context, &mut output).map_err(AppError::from)
            });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(app_error) => {
                error!(
                    target: LIFECYCLE_TARGET,
                    %command,
                    error = %app_error,
                    "lifecycle command failed"
                );
                let _ = writeln!(self.io.stderr, "{app_error}");
                ExitCode::FAILURE
            }
        }
    }

    fn usage(&mut self) -> ExitCode {
        let _ = writeln!(self.io.stderr, "{USAGE}");
        ExitCode::FAILURE
    }

    fn install_logging(&mut self, config: &Config, paths: &RuntimePaths) {
        if let Err(telemetry_error) = logging::initialise(config, paths.log_path()) {
            let _ = writeln!(
                self.io.stderr,
                "warning: logging disabled: {telemetry_error}"
            );
        }
    }
}

/// Runs the controller using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    CliRunner::new(&mut io, &OrthoConfigLoader).run(args)
}

#[cfg(test)]
mod tests;
