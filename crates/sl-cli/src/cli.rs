//! Command-line surface of `slctl`.

use clap::{Parser, ValueEnum};

/// Usage line printed for a missing or unknown verb.
pub(crate) const USAGE: &str = "Invalid command -- USAGE: slctl {START | STOP | STATUS | RESTART}";

/// Controller for the `sl-daemon` notification relay.
#[derive(Parser, Debug)]
#[command(name = "slctl", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Lifecycle verb to run; matched case-insensitively.
    #[arg(value_enum, ignore_case = true, value_name = "COMMAND")]
    pub(crate) command: Option<Verb>,
}

/// Lifecycle verbs accepted on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum Verb {
    /// Starts the daemon and waits for its readiness report.
    Start,
    /// Stops the running daemon and waits for it to exit.
    Stop,
    /// Reports whether the daemon is running.
    Status,
    /// Stops the daemon when running, then starts a fresh instance.
    Restart,
}
