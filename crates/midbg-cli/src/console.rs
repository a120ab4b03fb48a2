//! Observer that turns session notifications into terminal notices.
//!
//! The session calls its observer while it still holds itself mutably, so
//! the observer only records what happened. The driver drains the notices
//! once the session has returned and renders them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use midbg_session::{
    ExecutionFrame, LocalVariable, ModelKind, SessionObserver, SessionState, StackFrame,
};
use tracing::debug;

const CONSOLE_TARGET: &str = "midbg_cli::console";

/// Something to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    /// Debugger console or program output, printed verbatim.
    Text(String),
    /// A view was replaced and should be redrawn.
    View(ModelKind),
    /// The program stopped in a local source file.
    Source { path: PathBuf, line: u32 },
    /// The session changed state.
    State(SessionState),
    /// A command was rejected by the debugger.
    Rejected {
        command: Option<String>,
        message: String,
    },
    /// A message such as the program's exit reason.
    Message(String),
}

/// Shared queue written by [`ConsoleObserver`] and drained by the driver.
pub(crate) type Notices = Rc<RefCell<VecDeque<Notice>>>;

/// Records notifications as [`Notice`]s.
pub(crate) struct ConsoleObserver {
    notices: Notices,
}

impl ConsoleObserver {
    pub(crate) const fn new(notices: Notices) -> Self {
        Self { notices }
    }

    fn push(&self, notice: Notice) {
        self.notices.borrow_mut().push_back(notice);
    }
}

impl SessionObserver for ConsoleObserver {
    fn console_output(&mut self, text: &str) {
        self.push(Notice::Text(text.to_owned()));
    }

    fn target_output(&mut self, text: &str) {
        self.push(Notice::Text(text.to_owned()));
    }

    fn log_output(&mut self, text: &str) {
        debug!(target: CONSOLE_TARGET, text = text.trim_end(), "debugger log");
    }

    fn execution_replaced(&mut self, _frame: &ExecutionFrame) {
        self.push(Notice::View(ModelKind::Execution));
    }

    fn locals_replaced(&mut self, _locals: &[LocalVariable]) {
        self.push(Notice::View(ModelKind::Locals));
    }

    fn frames_replaced(&mut self, _frames: &[StackFrame]) {
        self.push(Notice::View(ModelKind::CallStack));
    }

    fn navigate(&mut self, path: &Path, line: u32) {
        self.push(Notice::Source {
            path: path.to_path_buf(),
            line,
        });
    }

    fn state_changed(&mut self, _previous: SessionState, current: SessionState) {
        self.push(Notice::State(current));
    }

    fn command_failed(&mut self, command: Option<&str>, message: &str) {
        self.push(Notice::Rejected {
            command: command.map(str::to_owned),
            message: message.to_owned(),
        });
    }

    fn cycle_message(&mut self, message: &str) {
        self.push(Notice::Message(message.to_owned()));
    }
}
