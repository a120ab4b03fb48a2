//! Error types surfaced by the session engine and the backend host.

use std::io;

use thiserror::Error;

/// Failures reported by a debugger session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The debugger executable could not be resolved.
    #[error("debugger executable '{tool}' was not found")]
    ExecutableNotFound {
        /// Tool name or path that failed to resolve.
        tool: String,
    },

    /// The debugger process could not be started.
    #[error("failed to start debugger: {command}")]
    SpawnFailed {
        /// Command line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The debugger exited without reporting a program exit first.
    #[error("debugger exited unexpectedly ({})", describe_exit(*.code))]
    ProcessExitedUnexpectedly {
        /// Exit status, or `None` when terminated by a signal.
        code: Option<i32>,
    },

    /// A command was submitted after the debugger process went away.
    #[error("cannot send '{command}': the debugger has terminated")]
    WriteAfterTerminated {
        /// Command text that was rejected.
        command: String,
    },

    /// An operation that needs a running debugger was called before `start`.
    #[error("the debug session has not been started")]
    NotStarted,

    /// `start` was called while a debugger process is still alive.
    #[error("a debug session is already running")]
    AlreadyRunning,

    /// Writing to or signalling the debugger failed.
    #[error("debugger transport error: {source}")]
    Transport {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(
        || String::from("terminated by signal"),
        |status| format!("exit status {status}"),
    )
}

/// Errors returned by [`crate::DebugHost`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// No backend is registered under the requested kind.
    #[error("no debugger backend registered for '{kind}'")]
    UnknownBackend {
        /// Kind requested by the caller.
        kind: String,
    },

    /// A backend with the same kind is already registered.
    #[error("a debugger backend for '{kind}' is already registered")]
    DuplicateBackend {
        /// Kind of the rejected backend.
        kind: String,
    },

    /// No backend has been selected as current.
    #[error("no current debugger backend is selected")]
    NoCurrentBackend,
}

impl HostError {
    pub(crate) fn unknown(kind: &str) -> Self {
        Self::UnknownBackend {
            kind: kind.to_owned(),
        }
    }

    pub(crate) fn duplicate(kind: &str) -> Self {
        Self::DuplicateBackend {
            kind: kind.to_owned(),
        }
    }
}
