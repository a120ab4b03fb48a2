//! Terminal front end for debuggers that speak GDB/MI.
//!
//! The binary delegates to [`midbg_cli::run`], which loads configuration,
//! starts the debugger and relays user commands until the session ends.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    midbg_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
