//! Capability interface shared by debugger backends.

use std::path::{Path, PathBuf};

use crate::errors::SessionError;
use crate::process::ProcessEvent;
use crate::resolve::Environment;
use crate::state::SessionState;
use crate::views::{ModelKind, ViewTable};

/// Operations a front end needs from any debugger backend.
///
/// Execution commands are queued and written as soon as the debugger is
/// ready; none of them waits for the debugger to respond.
pub trait DebuggerBackend {
    /// Identifier the backend is registered under, e.g. `debugger/gdb`.
    fn kind(&self) -> &str;

    /// Replaces the environment the debugger is started with.
    fn set_environment(&mut self, environment: Environment);

    /// Sets the directory the debugger is started in.
    fn set_working_directory(&mut self, directory: PathBuf);

    /// Starts debugging `program` with `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ExecutableNotFound`] when the debugger cannot
    /// be resolved, [`SessionError::AlreadyRunning`] when a debugger is still
    /// alive, or a spawn failure.
    fn start(&mut self, program: &Path, arguments: &[String]) -> Result<(), SessionError>;

    /// Asks the debugger to quit.
    ///
    /// # Errors
    ///
    /// Fails when no debugger is running or the command cannot be written.
    fn stop(&mut self) -> Result<(), SessionError>;

    /// Kills the debugger immediately.
    ///
    /// # Errors
    ///
    /// Fails when the session never started or the process cannot be killed.
    fn abort(&mut self) -> Result<(), SessionError>;

    /// Steps over the current line.
    ///
    /// # Errors
    ///
    /// Fails when no debugger is running or the command cannot be written.
    fn step_over(&mut self) -> Result<(), SessionError>;

    /// Steps into the call on the current line.
    ///
    /// # Errors
    ///
    /// Fails when no debugger is running or the command cannot be written.
    fn step_into(&mut self) -> Result<(), SessionError>;

    /// Runs until the current function returns.
    ///
    /// # Errors
    ///
    /// Fails when no debugger is running or the command cannot be written.
    fn step_out(&mut self) -> Result<(), SessionError>;

    /// Resumes execution until the next stop.
    ///
    /// # Errors
    ///
    /// Fails when no debugger is running or the command cannot be written.
    fn continue_execution(&mut self) -> Result<(), SessionError>;

    /// Whether a debugger process is alive.
    fn is_debugging(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// One of the derived views as a table.
    fn debug_model(&self, kind: ModelKind) -> ViewTable;

    /// Feeds an event from the process transport into the backend.
    fn handle_event(&mut self, event: ProcessEvent);
}
