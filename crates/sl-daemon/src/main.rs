use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match sl_daemon::run_daemon() {
        Ok(_cause) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "sl_daemon::main", error = %error, "daemon exited with error");
            let _ = writeln!(io::stderr(), "sl-daemon: {error}");
            ExitCode::FAILURE
        }
    }
}
