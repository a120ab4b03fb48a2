//! Command-line runtime for the `midbg` debugger front end.
//!
//! The runtime splits configuration flags from the debuggee invocation,
//! loads layered configuration, installs telemetry and then hands control to
//! the event loop in [`driver`], which owns the debugger session for its
//! whole lifetime. The IO streams and configuration loader are injectable so
//! tests can drive the runtime without a terminal.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod config;
mod console;
mod driver;
mod errors;
mod render;
mod repl;
mod telemetry;

use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use driver::{Terminal, run_session};
use errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `midbg_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--debugger",
    "--entry-breakpoint",
    "--runtime-source",
    "--runtime-substitute-from",
];

/// Debug a program through a GDB/MI debugger.
///
/// Configuration flags (`--debugger`, `--log-filter`, ...) must come before
/// the program. Once running, type `help` for the list of commands.
#[derive(Parser, Debug)]
#[command(name = "midbg", version)]
struct Cli {
    /// Program to debug.
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,
    /// Arguments passed to the program.
    #[arg(
        value_name = "ARG",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    arguments: Vec<String>,
}

/// Runs the CLI with process arguments, reading commands from stdin.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let input = BufReader::new(io::stdin());
    run_with(args, input, Terminal { stdout, stderr }, &OrthoConfigLoader)
}

fn run_with<I, R, W, E, L>(args: I, input: R, terminal: Terminal<'_, W, E>, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead + Send + 'static,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let Terminal { stdout, stderr } = terminal;
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let mut cli_arguments: Vec<OsString> = args.first().cloned().into_iter().collect();
    cli_arguments.extend(args.iter().skip(split.command_start).cloned());

    let cli = match Cli::try_parse_from(cli_arguments) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            return report(write!(stdout, "{error}"), ExitCode::SUCCESS);
        }
        Err(error) => return fail(&AppError::CliUsage(error), stderr),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            Ok(config)
        })
        .and_then(|config| {
            run_session(
                &config,
                &cli.program,
                &cli.arguments,
                input,
                Terminal {
                    stdout: &mut *stdout,
                    stderr: &mut *stderr,
                },
            )
        });

    match result {
        Ok(code) => code,
        Err(error) => fail(&error, stderr),
    }
}

fn fail<E: Write>(error: &AppError, stderr: &mut E) -> ExitCode {
    report(writeln!(stderr, "midbg: {error}"), ExitCode::FAILURE)
}

fn report(written: io::Result<()>, code: ExitCode) -> ExitCode {
    if written.is_ok() { code } else { ExitCode::FAILURE }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use midbg_config::Config;
    use rstest::rstest;

    use super::*;

    struct FixedLoader(Config);

    impl ConfigLoader for FixedLoader {
        fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
            Ok(self.0.clone())
        }
    }

    fn invoke(args: &[&str], loader: &FixedLoader) -> (ExitCode, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_with(
            args.iter().map(OsString::from),
            Cursor::new(Vec::new()),
            Terminal {
                stdout: &mut stdout,
                stderr: &mut stderr,
            },
            loader,
        );
        (
            code,
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
        )
    }

    #[rstest]
    fn missing_program_is_a_usage_error() {
        let (code, _, stderr) = invoke(&["midbg"], &FixedLoader(Config::default()));

        assert_eq!(code, ExitCode::FAILURE);
        assert!(stderr.contains("PROGRAM"), "stderr: {stderr}");
    }

    #[rstest]
    fn help_goes_to_stdout() {
        let (code, stdout, _) = invoke(&["midbg", "--help"], &FixedLoader(Config::default()));

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(stdout.contains("Program to debug"), "stdout: {stdout}");
    }

    #[rstest]
    fn unresolvable_debugger_fails_before_spawning() {
        let loader = FixedLoader(Config {
            debugger: Some(String::from("midbg-test-no-such-debugger")),
            ..Config::default()
        });

        let (code, _, stderr) = invoke(&["midbg", "./hello"], &loader);

        assert_eq!(code, ExitCode::FAILURE);
        assert!(
            stderr.contains("'midbg-test-no-such-debugger' was not found"),
            "stderr: {stderr}"
        );
    }
}
