//! Event loop that owns the debugger session.
//!
//! Process output, process exit and user input all arrive on one channel
//! and are handled in arrival order on the calling thread, so the session
//! is never touched from two places at once. Reader threads only forward
//! events into the channel.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use midbg_config::Config;
use midbg_session::{
    DebugHost, DebuggerBackend, EventSink, GDB_BACKEND_KIND, MiSession, ModelKind, ProcessEvent,
    SessionConfig, SessionError, SessionState, StdProcessLauncher,
};
use tracing::{debug, info, trace, warn};

use crate::console::{ConsoleObserver, Notice, Notices};
use crate::errors::AppError;
use crate::render::{render_stop, render_table};
use crate::repl::{HELP, UserCommand, parse_line};

const DRIVER_TARGET: &str = "midbg_cli::driver";

/// Everything the loop reacts to.
#[derive(Debug)]
pub(crate) enum LoopEvent {
    Process(ProcessEvent),
    Input(String),
    InputClosed,
}

/// Output streams used by the loop.
pub(crate) struct Terminal<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

/// Starts `program` under the configured debugger and relays `input` until
/// the session ends.
pub(crate) fn run_session<R, W, E>(
    config: &Config,
    program: &Path,
    arguments: &[String],
    input: R,
    terminal: Terminal<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    R: BufRead + Send + 'static,
    W: Write,
    E: Write,
{
    let (sender, receiver) = mpsc::channel();
    let process_sender = sender.clone();
    let sink: EventSink = Arc::new(move |event| {
        if process_sender.send(LoopEvent::Process(event)).is_err() {
            trace!(target: DRIVER_TARGET, "event loop has finished; dropping process event");
        }
    });

    let notices = Notices::default();
    let session = MiSession::new(
        SessionConfig::from_config(config),
        Box::new(StdProcessLauncher),
        sink,
    )
    .with_observer(Box::new(ConsoleObserver::new(Rc::clone(&notices))));

    let mut host = DebugHost::new();
    host.register(Box::new(session))?;
    host.set_current(GDB_BACKEND_KIND)?;
    host.current_mut()?
        .start(program, arguments)
        .map_err(|source| AppError::Start {
            program: program.display().to_string(),
            source,
        })?;
    info!(target: DRIVER_TARGET, program = %program.display(), "debug session started");

    spawn_input_reader(input, sender).map_err(AppError::InputReader)?;

    let mut driver = Driver {
        host,
        notices,
        receiver,
        terminal,
        exit_code: None,
    };
    driver.run()
}

fn spawn_input_reader<R>(mut input: R, sender: Sender<LoopEvent>) -> io::Result<()>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name(String::from("midbg-input"))
        .spawn(move || {
            loop {
                let mut line = String::new();
                let event = match input.read_line(&mut line) {
                    Ok(0) => LoopEvent::InputClosed,
                    Ok(_) => LoopEvent::Input(line),
                    Err(error) => {
                        warn!(target: DRIVER_TARGET, %error, "failed to read input");
                        LoopEvent::InputClosed
                    }
                };
                let closed = matches!(event, LoopEvent::InputClosed);
                if sender.send(event).is_err() || closed {
                    break;
                }
            }
        })
        .map(drop)
}

struct Driver<'a, W: Write, E: Write> {
    host: DebugHost,
    notices: Notices,
    receiver: Receiver<LoopEvent>,
    terminal: Terminal<'a, W, E>,
    exit_code: Option<Option<i32>>,
}

impl<W: Write, E: Write> Driver<'_, W, E> {
    fn run(&mut self) -> Result<ExitCode, AppError> {
        while let Ok(event) = self.receiver.recv() {
            match event {
                LoopEvent::Process(process_event) => {
                    if let ProcessEvent::Exited(code) = process_event {
                        self.exit_code = Some(code);
                    }
                    self.host.current_mut()?.handle_event(process_event);
                }
                LoopEvent::Input(line) => self.execute_line(&line)?,
                LoopEvent::InputClosed => self.request_stop()?,
            }
            self.flush_notices()?;

            let backend = self.host.current()?;
            if backend.state().is_terminal() && !backend.is_debugging() {
                break;
            }
        }
        self.outcome()
    }

    fn outcome(&self) -> Result<ExitCode, AppError> {
        match self.host.current()?.state() {
            SessionState::Failed => Err(AppError::SessionFailed(
                SessionError::ProcessExitedUnexpectedly {
                    code: self.exit_code.flatten(),
                },
            )),
            _ => Ok(ExitCode::SUCCESS),
        }
    }

    fn execute_line(&mut self, line: &str) -> Result<(), AppError> {
        match parse_line(line) {
            None => Ok(()),
            Some(Err(message)) => {
                writeln!(self.terminal.stderr, "{message}")?;
                Ok(())
            }
            Some(Ok(command)) => self.execute(command),
        }
    }

    fn execute(&mut self, command: UserCommand) -> Result<(), AppError> {
        debug!(target: DRIVER_TARGET, %command, "user command");
        let view = match command {
            UserCommand::Locals => Some(ModelKind::Locals),
            UserCommand::Frames => Some(ModelKind::CallStack),
            UserCommand::Where => Some(ModelKind::Execution),
            UserCommand::Help => {
                write!(self.terminal.stdout, "{HELP}")?;
                return Ok(());
            }
            _ => None,
        };
        if let Some(kind) = view {
            let table = self.host.current()?.debug_model(kind);
            write!(self.terminal.stdout, "{}", render_table(&table))?;
            return Ok(());
        }

        let backend = self.host.current_mut()?;
        let result = match command {
            UserCommand::Next => backend.step_over(),
            UserCommand::Step => backend.step_into(),
            UserCommand::Finish => backend.step_out(),
            UserCommand::Continue => backend.continue_execution(),
            UserCommand::Abort => backend.abort(),
            UserCommand::Stop => backend.stop(),
            UserCommand::Locals | UserCommand::Frames | UserCommand::Where | UserCommand::Help => {
                return Ok(());
            }
        };
        if let Err(error) = result {
            writeln!(self.terminal.stderr, "{command}: {error}")?;
        }
        Ok(())
    }

    /// Ends the session once input is exhausted, killing the debugger if it
    /// can no longer be asked to quit.
    fn request_stop(&mut self) -> Result<(), AppError> {
        let backend = self.host.current_mut()?;
        if !backend.is_debugging() {
            return Ok(());
        }
        debug!(target: DRIVER_TARGET, "input closed; stopping debugger");
        if let Err(error) = backend.stop() {
            warn!(target: DRIVER_TARGET, %error, "failed to stop debugger; killing it");
            if let Err(kill_error) = backend.abort() {
                warn!(target: DRIVER_TARGET, error = %kill_error, "failed to kill debugger");
            }
        }
        Ok(())
    }

    fn flush_notices(&mut self) -> Result<(), AppError> {
        loop {
            let Some(notice) = self.notices.borrow_mut().pop_front() else {
                break;
            };
            self.show_notice(notice)?;
        }
        self.terminal.stdout.flush()?;
        Ok(())
    }

    fn show_notice(&mut self, notice: Notice) -> Result<(), AppError> {
        let stdout = &mut *self.terminal.stdout;
        match notice {
            Notice::Text(text) => write!(stdout, "{text}")?,
            Notice::View(ModelKind::Execution) => {
                let table = self.host.current()?.debug_model(ModelKind::Execution);
                if let Some(summary) = render_stop(&table) {
                    write!(stdout, "{summary}")?;
                }
            }
            Notice::View(kind) => {
                let table = self.host.current()?.debug_model(kind);
                write!(stdout, "{}", render_table(&table))?;
            }
            Notice::Source { path, line } => writeln!(stdout, "  at {}:{line}", path.display())?,
            Notice::State(state) => writeln!(stdout, "[{state}]")?,
            Notice::Rejected { command, message } => match command {
                Some(text) => writeln!(self.terminal.stderr, "{text}: {message}")?,
                None => writeln!(self.terminal.stderr, "{message}")?,
            },
            Notice::Message(message) => writeln!(stdout, "program {message}")?,
        }
        Ok(())
    }
}
