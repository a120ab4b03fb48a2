//! Notifications a session emits towards the presentation layer.

use std::path::Path;

use crate::state::SessionState;
use crate::views::{ExecutionFrame, LocalVariable, StackFrame};

/// Receives session output. Every method defaults to doing nothing, so
/// implementors override only what they display.
pub trait SessionObserver {
    /// Text from the debugger console stream (`~`).
    fn console_output(&mut self, _text: &str) {}

    /// Text written by the program under test (`@`).
    fn target_output(&mut self, _text: &str) {}

    /// The debugger's own log text (`&`).
    fn log_output(&mut self, _text: &str) {}

    /// The execution view was replaced.
    fn execution_replaced(&mut self, _frame: &ExecutionFrame) {}

    /// The locals view was replaced.
    fn locals_replaced(&mut self, _locals: &[LocalVariable]) {}

    /// The call-stack view was replaced.
    fn frames_replaced(&mut self, _frames: &[StackFrame]) {}

    /// The program stopped in an existing local source file.
    fn navigate(&mut self, _path: &Path, _line: u32) {}

    /// The session moved between states.
    fn state_changed(&mut self, _previous: SessionState, _current: SessionState) {}

    /// A command was answered with `^error`.
    fn command_failed(&mut self, _command: Option<&str>, _message: &str) {}

    /// A message gathered while processing an output batch, such as the
    /// reason the program exited.
    fn cycle_message(&mut self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
