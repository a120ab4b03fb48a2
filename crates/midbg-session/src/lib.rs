//! Debug-session engine for debuggers that speak GDB/MI.
//!
//! The crate drives one external debugger per [`MiSession`]: it resolves and
//! spawns the executable, writes commands one at a time through a
//! [`CommandQueue`], parses every output line with `midbg-mi`, and keeps
//! three derived views (stop location, locals, call stack) up to date. The
//! process transport and executable lookup sit behind the
//! [`ProcessLauncher`] and [`ExecutableResolver`] traits so tests and
//! front ends can substitute their own. Presentation concerns reach the
//! caller through [`SessionObserver`].

mod backend;
mod command;
mod config;
mod errors;
mod host;
mod observer;
mod process;
mod resolve;
mod session;
mod state;
mod views;

pub use backend::DebuggerBackend;
pub use command::{Command, CommandQueue, DispatchedCommand};
pub use config::{MI_INTERPRETER_FLAG, SessionConfig};
pub use errors::{HostError, SessionError};
pub use host::DebugHost;
pub use observer::{NoopObserver, SessionObserver};
pub use process::{
    ChildProcess, EventSink, ProcessEvent, ProcessHandle, ProcessLauncher, SpawnRequest,
    StdProcessLauncher,
};
pub use resolve::{
    Environment, ExecutableResolver, PathResolver, inherited_environment, runtime_from_goroot,
};
pub use session::{GDB_BACKEND_KIND, MiSession};
pub use state::{CycleFlags, SessionState};
pub use views::{
    DebugViews, ExecutionFrame, LocalVariable, ModelKind, StackFrame, ViewTable, frames_from,
    locals_from,
};

#[cfg(test)]
mod tests;
