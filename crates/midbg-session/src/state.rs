//! Session lifecycle states and per-batch flags.

use strum::{AsRefStr, Display};

/// Lifecycle of one debugger session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    /// No process has been requested.
    #[default]
    NotStarted,
    /// The process was spawned and has not printed anything yet.
    Starting,
    /// The setup commands are being issued.
    Initializing,
    /// The program under test is executing.
    Running,
    /// The program is halted and can be inspected.
    Stopped,
    /// The program finished or the debugger was told to quit.
    Exited,
    /// The debugger died unexpectedly.
    Failed,
}

impl SessionState {
    /// Whether the session has ended, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exited | Self::Failed)
    }
}

/// Facts gathered while processing one output batch, cleared afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleFlags {
    /// A `stopped` notification arrived.
    pub stopped: bool,
    /// The stop reported that the program exited.
    pub exited: bool,
    /// Messages to surface once the batch completes, such as exit reasons.
    pub messages: Vec<String>,
}

impl CycleFlags {
    /// Resets every flag and message.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
