use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Debugger tool resolved when none is configured.
pub const DEFAULT_DEBUGGER: &str = "gdb";

/// Breakpoint installed before the program starts running.
pub const DEFAULT_ENTRY_BREAKPOINT: &str = "main.main";

/// Runtime source prefix recorded in binaries built by the Go toolchain.
pub const DEFAULT_RUNTIME_SUBSTITUTE_FROM: &str = "/go/src/pkg/runtime";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default debugger tool name.
#[must_use]
pub const fn default_debugger() -> &'static str {
    DEFAULT_DEBUGGER
}

/// Default entry breakpoint location.
#[must_use]
pub const fn default_entry_breakpoint() -> &'static str {
    DEFAULT_ENTRY_BREAKPOINT
}

/// Default runtime substitution prefix.
#[must_use]
pub const fn default_runtime_substitute_from() -> &'static str {
    DEFAULT_RUNTIME_SUBSTITUTE_FROM
}
