//! Session settings and the command lines they produce.

use std::path::{Path, PathBuf};

use midbg_config::{
    Config, DEFAULT_DEBUGGER, DEFAULT_ENTRY_BREAKPOINT, DEFAULT_RUNTIME_SUBSTITUTE_FROM,
};

use crate::command::Command;
use crate::resolve::{Environment, runtime_from_goroot};

/// Flag selecting the machine interface.
pub const MI_INTERPRETER_FLAG: &str = "--interpreter=mi";

/// Settings that shape how a session launches and initialises the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Tool name handed to executable resolution.
    pub debugger: String,
    /// Breakpoint installed before the program runs.
    pub entry_breakpoint: String,
    /// Explicit runtime source directory; otherwise derived from `GOROOT`.
    pub runtime_source: Option<PathBuf>,
    /// Prefix compiled into the program for runtime sources.
    pub runtime_substitute_from: String,
    /// Issue `set new-console on` first, as Windows hosts need.
    pub new_console: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debugger: String::from(DEFAULT_DEBUGGER),
            entry_breakpoint: String::from(DEFAULT_ENTRY_BREAKPOINT),
            runtime_source: None,
            runtime_substitute_from: String::from(DEFAULT_RUNTIME_SUBSTITUTE_FROM),
            new_console: cfg!(windows),
        }
    }
}

impl SessionConfig {
    /// Extracts the session settings from the layered configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            debugger: config.debugger().to_owned(),
            entry_breakpoint: config.entry_breakpoint().to_owned(),
            runtime_source: config.runtime_source().map(PathBuf::from),
            runtime_substitute_from: config.runtime_substitute_from().to_owned(),
            ..Self::default()
        }
    }

    /// Runtime source directory: the configured one, or `$GOROOT/src/pkg/runtime`.
    #[must_use]
    pub fn runtime_directory(&self, environment: &Environment) -> Option<PathBuf> {
        self.runtime_source
            .clone()
            .or_else(|| runtime_from_goroot(environment))
    }

    /// Arguments passed to the debugger executable.
    #[must_use]
    pub fn launch_arguments(
        program: &Path,
        arguments: &[String],
        runtime: Option<&Path>,
    ) -> Vec<String> {
        let mut launch = vec![String::from(MI_INTERPRETER_FLAG)];
        if let Some(directory) = runtime {
            launch.push(String::from("--directory"));
            launch.push(directory.display().to_string());
        }
        launch.push(String::from("--args"));
        launch.push(program.display().to_string());
        launch.extend(arguments.iter().cloned());
        launch
    }

    /// Setup commands issued once the debugger has printed its banner.
    #[must_use]
    pub fn init_commands(&self, runtime: Option<&Path>) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.new_console {
            commands.push(Command::new("set new-console on"));
        }
        commands.extend(
            [
                "set unwindonsignal on",
                "set overload-resolution off",
                "handle SIGSEGV nopass stop print",
                "set breakpoint pending on",
                "set width 0",
                "set height 0",
                "set auto-solib-add on",
            ]
            .map(Command::new),
        );
        if let Some(directory) = runtime {
            commands.push(Command::new(format!(
                "set substitute-path {} {}",
                self.runtime_substitute_from,
                directory.display()
            )));
        }
        commands.push(Command::new(format!("break {}", self.entry_breakpoint)));
        commands.push(Command::new("-exec-run"));
        commands
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn config() -> SessionConfig {
        SessionConfig {
            new_console: false,
            ..SessionConfig::default()
        }
    }

    fn texts(commands: &[Command]) -> Vec<&str> {
        commands.iter().map(Command::text).collect()
    }

    #[rstest]
    fn launch_arguments_without_runtime() {
        let arguments = SessionConfig::launch_arguments(
            Path::new("/work/hello"),
            &[String::from("-v"), String::from("input.txt")],
            None,
        );

        assert_eq!(
            arguments,
            vec!["--interpreter=mi", "--args", "/work/hello", "-v", "input.txt"]
        );
    }

    #[rstest]
    fn launch_arguments_with_runtime_directory() {
        let arguments = SessionConfig::launch_arguments(
            Path::new("hello"),
            &[],
            Some(Path::new("/opt/go/src/pkg/runtime")),
        );

        assert_eq!(
            arguments,
            vec![
                "--interpreter=mi",
                "--directory",
                "/opt/go/src/pkg/runtime",
                "--args",
                "hello"
            ]
        );
    }

    #[rstest]
    fn init_sequence_without_runtime(config: SessionConfig) {
        let commands = config.init_commands(None);

        assert_eq!(
            texts(&commands),
            vec![
                "set unwindonsignal on",
                "set overload-resolution off",
                "handle SIGSEGV nopass stop print",
                "set breakpoint pending on",
                "set width 0",
                "set height 0",
                "set auto-solib-add on",
                "break main.main",
                "-exec-run",
            ]
        );
    }

    #[rstest]
    fn init_sequence_substitutes_runtime_path(config: SessionConfig) {
        let commands = config.init_commands(Some(Path::new("/opt/go/src/pkg/runtime")));

        assert!(
            texts(&commands)
                .contains(&"set substitute-path /go/src/pkg/runtime /opt/go/src/pkg/runtime")
        );
    }

    #[rstest]
    fn new_console_comes_first() {
        let config = SessionConfig {
            new_console: true,
            ..SessionConfig::default()
        };

        let commands = config.init_commands(None);

        assert_eq!(commands.first().map(Command::text), Some("set new-console on"));
    }

    #[rstest]
    fn configured_runtime_wins_over_goroot(config: SessionConfig) {
        let explicit = SessionConfig {
            runtime_source: Some(PathBuf::from("/src/runtime")),
            ..config.clone()
        };
        let environment = Environment::from([(String::from("GOROOT"), String::from("/opt/go"))]);

        assert_eq!(
            explicit.runtime_directory(&environment),
            Some(PathBuf::from("/src/runtime"))
        );
        assert_eq!(
            config.runtime_directory(&environment),
            Some(PathBuf::from("/opt/go/src/pkg/runtime"))
        );
    }

    #[rstest]
    fn from_config_copies_layered_values() {
        let layered = Config {
            debugger: Some(String::from("gdb-multiarch")),
            entry_breakpoint: Some(String::from("main")),
            runtime_source: Some(String::from("/r")),
            ..Config::default()
        };

        let config = SessionConfig::from_config(&layered);

        assert_eq!(config.debugger, "gdb-multiarch");
        assert_eq!(config.entry_breakpoint, "main");
        assert_eq!(config.runtime_source, Some(PathBuf::from("/r")));
        assert_eq!(config.runtime_substitute_from, "/go/src/pkg/runtime");
    }
}
