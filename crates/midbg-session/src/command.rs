//! Outgoing command queue with single-in-flight dispatch.
//!
//! Commands are written one at a time. Each written command receives the
//! next token, rendered as eight zero-padded digits in front of the command
//! text, and stays in flight until a result record arrives. Replies are
//! matched to the in-flight command by position, not by token: the token is
//! sent because the protocol allows it and because it makes transcripts
//! readable.

use std::collections::VecDeque;

/// One command waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    expects_result: bool,
}

impl Command {
    /// A command answered by a result record, which covers every MI command
    /// and CLI commands run through the MI interpreter.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_result: true,
        }
    }

    /// A command that completes as soon as it is written.
    #[must_use]
    pub fn without_result(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_result: false,
        }
    }

    /// Command text without token or terminator.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a result record is awaited after writing.
    #[must_use]
    pub const fn expects_result(&self) -> bool {
        self.expects_result
    }
}

/// A command that has been taken from the queue for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedCommand {
    /// Token assigned at dispatch.
    pub token: u64,
    /// The command itself.
    pub command: Command,
}

impl DispatchedCommand {
    /// Bytes written to the debugger's stdin: `<token><text>\r\n`.
    #[must_use]
    pub fn wire_line(&self) -> String {
        format!("{:08}{}\r\n", self.token, self.command.text())
    }
}

/// FIFO of pending commands plus the one currently awaiting its reply.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
    next_token: u64,
    in_flight: Option<DispatchedCommand>,
    busy: bool,
}

impl CommandQueue {
    /// Creates an empty queue whose first token is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn enqueue(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Appends several commands in order.
    ///
    /// Nothing is written while appending, so the commands reach the
    /// debugger as one uninterrupted run.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Inserts several commands, in order, ahead of everything pending.
    pub fn extend_front(&mut self, commands: impl IntoIterator<Item = Command>) {
        let mut front: VecDeque<Command> = commands.into_iter().collect();
        front.append(&mut self.pending);
        self.pending = front;
    }

    /// Commands not yet written, front first.
    pub fn pending(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// Number of commands not yet written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no command is waiting to be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The command awaiting its result record, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<&DispatchedCommand> {
        self.in_flight.as_ref()
    }

    /// Marks whether an output batch is being processed.
    pub const fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Whether an output batch is being processed.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Takes the front command for writing and assigns its token.
    ///
    /// Returns `None` while busy, while another command is in flight, or
    /// when nothing is pending.
    pub fn dispatch_next(&mut self) -> Option<DispatchedCommand> {
        if self.busy || self.in_flight.is_some() {
            return None;
        }
        let command = self.pending.pop_front()?;
        let dispatched = DispatchedCommand {
            token: self.next_token,
            command,
        };
        self.next_token += 1;
        if dispatched.command.expects_result() {
            self.in_flight = Some(dispatched.clone());
        }
        Some(dispatched)
    }

    /// Completes the in-flight command, returning it.
    pub const fn complete(&mut self) -> Option<DispatchedCommand> {
        self.in_flight.take()
    }

    /// Drops pending and in-flight commands. Token numbering continues.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.in_flight = None;
        self.busy = false;
    }
}
