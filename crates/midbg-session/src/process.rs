//! Debugger process transport.
//!
//! The session never blocks on the child. Reader threads forward output
//! chunks, and an exit watcher reports the exit status, all through an
//! [`EventSink`] that the owner of the session drains on its own thread.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::SessionError;
use crate::resolve::Environment;

const PROCESS_TARGET: &str = "midbg_session::process";

/// How often the exit watcher polls the child.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

const READ_BUFFER_SIZE: usize = 4096;

/// Something that happened to the debugger process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// Bytes read from stdout.
    Stdout(Vec<u8>),
    /// Bytes read from stderr.
    Stderr(Vec<u8>),
    /// The process ended; `None` when killed by a signal.
    Exited(Option<i32>),
}

/// Callback that receives process events, possibly from other threads.
pub type EventSink = Arc<dyn Fn(ProcessEvent) + Send + Sync>;

/// Everything needed to start the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Resolved executable.
    pub program: PathBuf,
    /// Command-line arguments.
    pub arguments: Vec<String>,
    /// Directory to start in; inherits the caller's when `None`.
    pub working_directory: Option<PathBuf>,
    /// Complete environment; inherits the caller's when `None`.
    pub environment: Option<Environment>,
}

impl SpawnRequest {
    /// The command line, for messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for argument in &self.arguments {
            line.push(' ');
            line.push_str(argument);
        }
        line
    }
}

/// A running debugger process.
pub trait ProcessHandle {
    /// Writes bytes to the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the pipe is closed.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Terminates the process.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the process cannot be signalled.
    fn kill(&mut self) -> io::Result<()>;
}

/// Starts debugger processes.
pub trait ProcessLauncher {
    /// Spawns the process described by `request`, reporting its output and
    /// exit through `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ExecutableNotFound`] when the program does not
    /// exist and [`SessionError::SpawnFailed`] for other start-up failures.
    fn spawn(
        &self,
        request: &SpawnRequest,
        sink: EventSink,
    ) -> Result<Box<dyn ProcessHandle>, SessionError>;
}

/// Launches real child processes with piped stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessLauncher;

impl ProcessLauncher for StdProcessLauncher {
    fn spawn(
        &self,
        request: &SpawnRequest,
        sink: EventSink,
    ) -> Result<Box<dyn ProcessHandle>, SessionError> {
        debug!(
            target: PROCESS_TARGET,
            program = %request.program.display(),
            arguments = ?request.arguments,
            "spawning debugger process"
        );

        let mut command = Command::new(&request.program);
        command
            .args(&request.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(directory) = &request.working_directory {
            command.current_dir(directory);
        }
        if let Some(environment) = &request.environment {
            command.env_clear().envs(environment);
        }

        let mut child = command.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SessionError::ExecutableNotFound {
                    tool: request.program.display().to_string(),
                }
            } else {
                SessionError::SpawnFailed {
                    command: request.command_line(),
                    source,
                }
            }
        })?;

        let spawn_failed = |what: &str| SessionError::SpawnFailed {
            command: request.command_line(),
            source: io::Error::other(format!("{what} was not captured")),
        };
        let stdin = child.stdin.take().ok_or_else(|| spawn_failed("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| spawn_failed("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| spawn_failed("stderr"))?;
        let pid = child.id();
        let child = Arc::new(Mutex::new(child));

        let thread_failed = |source| SessionError::SpawnFailed {
            command: request.command_line(),
            source,
        };
        let readers = vec![
            spawn_reader("midbg-stdout", stdout, Arc::clone(&sink), ProcessEvent::Stdout)
                .map_err(thread_failed)?,
            spawn_reader("midbg-stderr", stderr, Arc::clone(&sink), ProcessEvent::Stderr)
                .map_err(thread_failed)?,
        ];
        spawn_exit_watcher(Arc::clone(&child), readers, sink).map_err(thread_failed)?;

        debug!(target: PROCESS_TARGET, pid, "debugger process spawned");
        Ok(Box::new(ChildProcess { child, stdin }))
    }
}

fn spawn_reader<R>(
    name: &str,
    mut reader: R,
    sink: EventSink,
    wrap: fn(Vec<u8>) -> ProcessEvent,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let mut buffer = [0_u8; READ_BUFFER_SIZE];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(read) => {
                        let chunk = buffer.get(..read).unwrap_or_default().to_vec();
                        sink(wrap(chunk));
                    }
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                    Err(error) => {
                        warn!(target: PROCESS_TARGET, %error, "debugger pipe read failed");
                        break;
                    }
                }
            }
        })
}

/// Waits for the child to exit, lets the readers drain, then reports the exit.
///
/// Joining the readers first guarantees that the exit event is the last
/// event delivered for the process.
fn spawn_exit_watcher(
    child: Arc<Mutex<Child>>,
    readers: Vec<JoinHandle<()>>,
    sink: EventSink,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(String::from("midbg-exit"))
        .spawn(move || {
            let code = loop {
                let status = child
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .try_wait();
                match status {
                    Ok(Some(exit)) => break exit.code(),
                    Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
                    Err(error) => {
                        warn!(target: PROCESS_TARGET, %error, "failed to poll debugger process");
                        break None;
                    }
                }
            };
            for reader in readers {
                if reader.join().is_err() {
                    warn!(target: PROCESS_TARGET, "debugger pipe reader panicked");
                }
            }
            sink(ProcessEvent::Exited(code));
        })
}

/// Handle to a debugger started by [`StdProcessLauncher`].
///
/// Dropping the handle kills the process if it is still running.
pub struct ChildProcess {
    child: Arc<Mutex<Child>>,
    stdin: ChildStdin,
}

impl fmt::Debug for ChildProcess {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pid = self
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .id();
        formatter
            .debug_struct("ChildProcess")
            .field("pid", &pid)
            .finish_non_exhaustive()
    }
}

impl ProcessHandle for ChildProcess {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdin.write_all(bytes)?;
        self.stdin.flush()
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        match child.kill() {
            // Already reaped by the exit watcher.
            Err(error) if error.kind() == io::ErrorKind::InvalidInput => Ok(()),
            result => result,
        }
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(child.try_wait(), Ok(None)) {
            debug!(target: PROCESS_TARGET, pid = child.id(), "killing debugger on drop");
            if let Err(error) = child.kill() {
                warn!(target: PROCESS_TARGET, %error, "failed to kill debugger on drop");
            }
        }
    }
}
