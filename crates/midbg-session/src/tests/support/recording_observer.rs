//! Observer double that keeps every notification.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observer::SessionObserver;
use crate::state::SessionState;
use crate::views::{ExecutionFrame, LocalVariable, StackFrame};

/// Notifications captured by [`RecordingObserver`].
#[derive(Debug, Default, Clone)]
pub struct Observed {
    pub console: Vec<String>,
    pub target: Vec<String>,
    pub log: Vec<String>,
    pub executions: Vec<ExecutionFrame>,
    pub locals_updates: usize,
    pub frames_updates: usize,
    pub navigations: Vec<(PathBuf, u32)>,
    pub transitions: Vec<(SessionState, SessionState)>,
    pub failures: Vec<(Option<String>, String)>,
    pub messages: Vec<String>,
}

/// Observer that shares its log with the test.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    shared: Arc<Mutex<Observed>>,
}

impl RecordingObserver {
    /// Snapshot of everything observed so far.
    pub fn observed(&self) -> Observed {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Observed> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionObserver for RecordingObserver {
    fn console_output(&mut self, text: &str) {
        self.lock().console.push(text.to_owned());
    }

    fn target_output(&mut self, text: &str) {
        self.lock().target.push(text.to_owned());
    }

    fn log_output(&mut self, text: &str) {
        self.lock().log.push(text.to_owned());
    }

    fn execution_replaced(&mut self, frame: &ExecutionFrame) {
        self.lock().executions.push(frame.clone());
    }

    fn locals_replaced(&mut self, _locals: &[LocalVariable]) {
        self.lock().locals_updates += 1;
    }

    fn frames_replaced(&mut self, _frames: &[StackFrame]) {
        self.lock().frames_updates += 1;
    }

    fn navigate(&mut self, path: &Path, line: u32) {
        self.lock().navigations.push((path.to_path_buf(), line));
    }

    fn state_changed(&mut self, previous: SessionState, current: SessionState) {
        self.lock().transitions.push((previous, current));
    }

    fn command_failed(&mut self, command: Option<&str>, message: &str) {
        self.lock()
            .failures
            .push((command.map(str::to_owned), message.to_owned()));
    }

    fn cycle_message(&mut self, message: &str) {
        self.lock().messages.push(message.to_owned());
    }
}
