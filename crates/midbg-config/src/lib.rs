//! Shared configuration for the MI debugger front end.
//!
//! Values are layered by `ortho_config`: a TOML file (selected with
//! `--config-path` or `MIDBG_CONFIG_PATH`), `MIDBG_*` environment variables and
//! command-line flags, with later layers taking precedence. Every field is
//! optional so partially specified layers merge cleanly; the accessor methods
//! resolve the built-in defaults from [`defaults`].

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DEBUGGER, DEFAULT_ENTRY_BREAKPOINT, DEFAULT_LOG_FILTER, DEFAULT_RUNTIME_SUBSTITUTE_FROM,
    default_debugger, default_entry_breakpoint, default_log_filter, default_log_format,
    default_runtime_substitute_from,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Layered configuration consumed by the session engine and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MIDBG")]
pub struct Config {
    /// Tracing filter expression, e.g. `info` or `midbg_session=debug`.
    pub log_filter: Option<String>,
    /// Output format used by the tracing subscriber.
    pub log_format: Option<LogFormat>,
    /// Logical name (or path) of the debugger executable to resolve.
    pub debugger: Option<String>,
    /// Breakpoint location installed before the program is run.
    pub entry_breakpoint: Option<String>,
    /// Explicit directory holding the runtime sources.
    pub runtime_source: Option<String>,
    /// Path prefix compiled into the program for the runtime sources.
    pub runtime_substitute_from: Option<String>,
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(default_log_filter())
    }

    /// Tracing output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Debugger tool name handed to executable resolution.
    #[must_use]
    pub fn debugger(&self) -> &str {
        self.debugger.as_deref().unwrap_or(default_debugger())
    }

    /// Breakpoint location installed during session initialisation.
    #[must_use]
    pub fn entry_breakpoint(&self) -> &str {
        self.entry_breakpoint
            .as_deref()
            .unwrap_or(default_entry_breakpoint())
    }

    /// Explicitly configured runtime source directory, if any.
    #[must_use]
    pub fn runtime_source(&self) -> Option<&str> {
        self.runtime_source.as_deref().filter(|dir| !dir.is_empty())
    }

    /// Path prefix rewritten to the runtime source directory.
    #[must_use]
    pub fn runtime_substitute_from(&self) -> &str {
        self.runtime_substitute_from
            .as_deref()
            .unwrap_or(default_runtime_substitute_from())
    }
}
