//! MI-speaking debugger session.
//!
//! [`MiSession`] owns everything about one debugger process: the line
//! framer, the command queue, the lifecycle state and the derived views.
//! Each stdout chunk is handled as one batch. Every complete line is parsed
//! and routed first; only then does the session queue follow-up commands
//! (the setup sequence after the first batch, a locals/frames refresh after
//! a stop, `-gdb-exit` after the program exits) and write the next command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use midbg_mi::{
    AsyncRecord, LineFramer, MiValue, Record, ResultClass, ResultRecord, StreamKind, StreamRecord,
    parse_record,
};
use tracing::{debug, error, trace, warn};

use crate::backend::DebuggerBackend;
use crate::command::{Command, CommandQueue};
use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::observer::{NoopObserver, SessionObserver};
use crate::process::{EventSink, ProcessEvent, ProcessHandle, ProcessLauncher, SpawnRequest};
use crate::resolve::{Environment, ExecutableResolver, PathResolver, inherited_environment};
use crate::state::{CycleFlags, SessionState};
use crate::views::{DebugViews, ExecutionFrame, ModelKind, ViewTable, frames_from, locals_from};

const SESSION_TARGET: &str = "midbg_session::session";

/// Kind under which [`MiSession`] registers with a [`crate::DebugHost`].
pub const GDB_BACKEND_KIND: &str = "debugger/gdb";

const EXIT_COMMAND: &str = "-gdb-exit";
const LIST_LOCALS_COMMAND: &str = "-stack-list-locals 2";
const LIST_FRAMES_COMMAND: &str = "-stack-list-frames";
const STEP_OVER_COMMAND: &str = "-exec-next";
const STEP_INTO_COMMAND: &str = "-exec-step";
const STEP_OUT_COMMAND: &str = "-exec-finish";
const CONTINUE_COMMAND: &str = "-exec-continue";

/// A debugger session driven over GDB/MI.
pub struct MiSession {
    config: SessionConfig,
    launcher: Box<dyn ProcessLauncher>,
    resolver: Box<dyn ExecutableResolver>,
    observer: Box<dyn SessionObserver>,
    sink: EventSink,
    environment: Option<Environment>,
    working_directory: Option<PathBuf>,
    process: Option<Box<dyn ProcessHandle>>,
    runtime: Option<PathBuf>,
    framer: LineFramer,
    queue: CommandQueue,
    state: SessionState,
    cycle: CycleFlags,
    views: DebugViews,
    initialised: bool,
    exit_acknowledged: bool,
    aborted: bool,
    failure: Option<SessionError>,
}

impl MiSession {
    /// Creates a session that starts debuggers with `launcher` and routes
    /// their events to `sink`.
    ///
    /// The debugger is resolved from `PATH` and output is discarded until an
    /// observer is attached.
    #[must_use]
    pub fn new(config: SessionConfig, launcher: Box<dyn ProcessLauncher>, sink: EventSink) -> Self {
        Self {
            config,
            launcher,
            resolver: Box::new(PathResolver),
            observer: Box::new(NoopObserver),
            sink,
            environment: None,
            working_directory: None,
            process: None,
            runtime: None,
            framer: LineFramer::new(),
            queue: CommandQueue::new(),
            state: SessionState::NotStarted,
            cycle: CycleFlags::default(),
            views: DebugViews::default(),
            initialised: false,
            exit_acknowledged: false,
            aborted: false,
            failure: None,
        }
    }

    /// Replaces the executable resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn ExecutableResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Attaches an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The derived views.
    #[must_use]
    pub const fn views(&self) -> &DebugViews {
        &self.views
    }

    /// Outgoing commands.
    #[must_use]
    pub const fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Flags gathered in the batch currently being processed.
    #[must_use]
    pub const fn cycle(&self) -> &CycleFlags {
        &self.cycle
    }

    /// Why the session failed, once it is [`SessionState::Failed`].
    #[must_use]
    pub const fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    /// Routes one parsed record.
    ///
    /// Follow-up commands are only queued when the surrounding batch ends,
    /// so a record handled on its own leaves them pending in
    /// [`MiSession::cycle`].
    pub fn handle_record(&mut self, record: Record) {
        match record {
            Record::Result(result) => self.handle_result(&result),
            Record::Async(notification) => self.handle_async(&notification),
            Record::Stream(stream) => self.handle_stream(&stream),
            Record::Prompt => trace!(target: SESSION_TARGET, "prompt"),
            Record::Unknown(unknown) => warn!(
                target: SESSION_TARGET,
                line = %unknown.line,
                discriminator = ?unknown.discriminator,
                "ignoring unrecognised output line"
            ),
        }
    }

    fn on_stdout(&mut self, chunk: &[u8]) {
        if self.state == SessionState::Starting {
            self.transition(SessionState::Initializing);
        }
        self.framer.push(chunk);
        self.queue.set_busy(true);
        while let Some(line) = self.framer.next_line() {
            self.handle_line(&line);
        }
        self.queue.set_busy(false);
        self.finish_batch();
    }

    fn handle_line(&mut self, line: &str) {
        match parse_record(line) {
            Ok(parsed) => {
                for fragment in &parsed.dropped {
                    warn!(
                        target: SESSION_TARGET,
                        line,
                        error = %fragment,
                        "dropped malformed value fragment"
                    );
                }
                self.handle_record(parsed.record);
            }
            Err(parse_error) => warn!(
                target: SESSION_TARGET,
                line,
                error = %parse_error,
                "discarding malformed record"
            ),
        }
    }

    fn handle_result(&mut self, result: &ResultRecord) {
        let completed = self.queue.complete();
        match (&completed, result.token) {
            (Some(dispatched), Some(token)) if dispatched.token != token => debug!(
                target: SESSION_TARGET,
                expected = dispatched.token,
                received = token,
                "result token does not match the command in flight"
            ),
            (None, _) => debug!(
                target: SESSION_TARGET,
                class = %result.class,
                "result arrived with no command in flight"
            ),
            _ => {}
        }

        let command = completed.as_ref().map(|dispatched| dispatched.command.text());
        match result.class {
            ResultClass::Error => {
                let message = result.data.field("msg");
                warn!(target: SESSION_TARGET, command, message, "debugger rejected command");
                self.observer.command_failed(command, message);
            }
            ResultClass::Exit => self.exit_acknowledged = true,
            ResultClass::Running => self.transition(SessionState::Running),
            ResultClass::Done | ResultClass::Connected | ResultClass::Unknown => {}
        }
        self.update_views(&result.data);
    }

    fn update_views(&mut self, data: &MiValue) {
        if let Some(locals) = data.find("locals").filter(|value| value.is_list()) {
            self.views.locals = locals_from(locals);
            debug!(target: SESSION_TARGET, rows = self.views.locals.len(), "locals replaced");
            self.observer.locals_replaced(&self.views.locals);
            return;
        }
        if let Some(stack) = data.find("stack").filter(|value| value.is_list()) {
            self.views.frames = frames_from(stack);
            debug!(target: SESSION_TARGET, rows = self.views.frames.len(), "frames replaced");
            self.observer.frames_replaced(&self.views.frames);
        }
    }

    fn handle_async(&mut self, notification: &AsyncRecord) {
        match notification.class.as_str() {
            "stopped" => self.handle_stopped(&notification.results),
            "running" => self.transition(SessionState::Running),
            _ => trace!(
                target: SESSION_TARGET,
                kind = %notification.kind,
                class = %notification.class,
                "ignoring async record"
            ),
        }
    }

    fn handle_stopped(&mut self, results: &MiValue) {
        let reason = results.field("reason");
        debug!(target: SESSION_TARGET, reason, "program stopped");
        self.cycle.stopped = true;
        self.transition(SessionState::Stopped);
        if reason.starts_with("exited") {
            self.cycle.exited = true;
            self.exit_acknowledged = true;
            self.cycle.messages.push(reason.to_owned());
        }

        let Some(frame) = results.find("frame") else {
            return;
        };
        let execution = ExecutionFrame::from_stop(frame, results.field("thread-id"));
        self.observer.execution_replaced(&execution);
        if let Some(line) = execution.line_number() {
            let source = Path::new(&execution.full_path);
            if !execution.full_path.is_empty() && source.is_file() {
                self.observer.navigate(source, line);
            }
        }
        self.views.execution = Some(execution);
    }

    fn handle_stream(&mut self, stream: &StreamRecord) {
        debug!(
            target: SESSION_TARGET,
            stream = %stream.kind,
            text = stream.text.trim_end(),
            "stream output"
        );
        match stream.kind {
            StreamKind::Console => self.observer.console_output(&stream.text),
            StreamKind::Target => self.observer.target_output(&stream.text),
            StreamKind::Log => self.observer.log_output(&stream.text),
        }
    }

    fn finish_batch(&mut self) {
        if !self.initialised {
            self.initialised = true;
            let commands = self.config.init_commands(self.runtime.as_deref());
            debug!(
                target: SESSION_TARGET,
                count = commands.len(),
                "queueing initialisation commands"
            );
            self.queue.extend_front(commands);
        }
        if self.cycle.stopped {
            self.queue.extend([
                Command::new(LIST_LOCALS_COMMAND),
                Command::new(LIST_FRAMES_COMMAND),
            ]);
        }
        if self.cycle.exited {
            self.queue.enqueue(Command::new(EXIT_COMMAND));
            self.transition(SessionState::Exited);
        }

        let cycle = std::mem::take(&mut self.cycle);
        for message in &cycle.messages {
            self.observer.cycle_message(message);
        }

        if let Err(dispatch_error) = self.dispatch_next() {
            warn!(target: SESSION_TARGET, error = %dispatch_error, "failed to write command");
        }
    }

    /// Writes queued commands until one awaits a reply.
    fn dispatch_next(&mut self) -> Result<(), SessionError> {
        if !self.initialised {
            return Ok(());
        }
        let Some(process) = self.process.as_mut() else {
            return Ok(());
        };
        while let Some(dispatched) = self.queue.dispatch_next() {
            debug!(
                target: SESSION_TARGET,
                token = dispatched.token,
                command = dispatched.command.text(),
                "dispatching command"
            );
            if let Err(source) = process.write(dispatched.wire_line().as_bytes()) {
                self.queue.complete();
                return Err(SessionError::Transport { source });
            }
        }
        Ok(())
    }

    fn submit(&mut self, text: &str) -> Result<(), SessionError> {
        if self.state == SessionState::NotStarted {
            return Err(SessionError::NotStarted);
        }
        if self.process.is_none() {
            warn!(
                target: SESSION_TARGET,
                command = text,
                "rejecting command for terminated debugger"
            );
            return Err(SessionError::WriteAfterTerminated {
                command: text.to_owned(),
            });
        }
        self.queue.enqueue(Command::new(text));
        self.dispatch_next()
    }

    fn on_exited(&mut self, code: Option<i32>) {
        if self.process.take().is_none() {
            trace!(target: SESSION_TARGET, code, "ignoring exit of a process already reaped");
            return;
        }
        self.queue.clear();
        if self.exit_acknowledged || self.aborted || code == Some(0) {
            debug!(target: SESSION_TARGET, code, "debugger exited");
            self.transition(SessionState::Exited);
        } else {
            error!(target: SESSION_TARGET, code, "debugger exited unexpectedly");
            self.failure = Some(SessionError::ProcessExitedUnexpectedly { code });
            self.transition(SessionState::Failed);
        }
    }

    fn transition(&mut self, next: SessionState) {
        let previous = self.state;
        if previous == next {
            return;
        }
        if previous.is_terminal() && !next.is_terminal() {
            trace!(
                target: SESSION_TARGET,
                from = %previous,
                to = %next,
                "ignoring transition out of a finished session"
            );
            return;
        }
        debug!(target: SESSION_TARGET, from = %previous, to = %next, "session state changed");
        self.state = next;
        self.observer.state_changed(previous, next);
    }

    fn reset(&mut self) {
        self.framer = LineFramer::new();
        self.queue.clear();
        self.cycle.clear();
        self.views = DebugViews::default();
        self.initialised = false;
        self.exit_acknowledged = false;
        self.aborted = false;
        self.failure = None;
        self.state = SessionState::NotStarted;
    }
}

impl DebuggerBackend for MiSession {
    fn kind(&self) -> &str {
        GDB_BACKEND_KIND
    }

    fn set_environment(&mut self, environment: Environment) {
        self.environment = (!environment.is_empty()).then_some(environment);
    }

    fn set_working_directory(&mut self, directory: PathBuf) {
        self.working_directory = Some(directory);
    }

    fn start(&mut self, program: &Path, arguments: &[String]) -> Result<(), SessionError> {
        if self.process.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let environment = self
            .environment
            .clone()
            .unwrap_or_else(inherited_environment);
        let Some(executable) = self.resolver.resolve(&self.config.debugger, &environment) else {
            warn!(
                target: SESSION_TARGET,
                tool = %self.config.debugger,
                "debugger executable not found"
            );
            return Err(SessionError::ExecutableNotFound {
                tool: self.config.debugger.clone(),
            });
        };

        let runtime = self.config.runtime_directory(&environment);
        let request = SpawnRequest {
            program: executable,
            arguments: SessionConfig::launch_arguments(program, arguments, runtime.as_deref()),
            working_directory: self.working_directory.clone(),
            environment: self.environment.clone(),
        };
        let handle = self.launcher.spawn(&request, Arc::clone(&self.sink))?;

        self.reset();
        self.process = Some(handle);
        self.runtime = runtime;
        debug!(target: SESSION_TARGET, command = %request.command_line(), "debugger started");
        self.transition(SessionState::Starting);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.submit(EXIT_COMMAND)
    }

    fn abort(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::NotStarted {
            return Err(SessionError::NotStarted);
        }
        let Some(process) = self.process.as_mut() else {
            return Ok(());
        };
        debug!(target: SESSION_TARGET, "killing debugger");
        self.aborted = true;
        process
            .kill()
            .map_err(|source| SessionError::Transport { source })
    }

    fn step_over(&mut self) -> Result<(), SessionError> {
        self.submit(STEP_OVER_COMMAND)
    }

    fn step_into(&mut self) -> Result<(), SessionError> {
        self.submit(STEP_INTO_COMMAND)
    }

    fn step_out(&mut self) -> Result<(), SessionError> {
        self.submit(STEP_OUT_COMMAND)
    }

    fn continue_execution(&mut self) -> Result<(), SessionError> {
        self.submit(CONTINUE_COMMAND)
    }

    fn is_debugging(&self) -> bool {
        self.process.is_some()
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn debug_model(&self, kind: ModelKind) -> ViewTable {
        self.views.table(kind)
    }

    fn handle_event(&mut self, event: ProcessEvent) {
        match event {
            ProcessEvent::Stdout(chunk) => self.on_stdout(&chunk),
            ProcessEvent::Stderr(chunk) => {
                let text = String::from_utf8_lossy(&chunk);
                warn!(target: SESSION_TARGET, text = text.trim_end(), "debugger wrote to stderr");
            }
            ProcessEvent::Exited(code) => self.on_exited(code),
        }
    }
}
