//! Entry point for `slctl`, the `sl-daemon` controller.
//!
//! Delegates to [`sl_cli::run`], which parses the lifecycle verb, loads the
//! shared configuration and drives the daemon lifecycle.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    sl_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
