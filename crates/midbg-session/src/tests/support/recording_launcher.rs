//! Process launcher double that records spawns and writes.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::SessionError;
use crate::process::{EventSink, ProcessHandle, ProcessLauncher, SpawnRequest};

#[derive(Debug, Default)]
struct LaunchLog {
    requests: Vec<SpawnRequest>,
    writes: Vec<String>,
    kills: usize,
    fail_writes: bool,
}

/// Launcher that never starts a process but remembers what it was asked.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    shared: Arc<Mutex<LaunchLog>>,
    missing: bool,
}

impl RecordingLauncher {
    /// A launcher whose spawns always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher that reports every program as missing.
    pub fn missing_program() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Handle for asserting on recorded activity.
    pub fn handle(&self) -> LaunchHandle {
        LaunchHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn spawn(
        &self,
        request: &SpawnRequest,
        _sink: EventSink,
    ) -> Result<Box<dyn ProcessHandle>, SessionError> {
        if self.missing {
            return Err(SessionError::ExecutableNotFound {
                tool: request.program.display().to_string(),
            });
        }
        lock(&self.shared).requests.push(request.clone());
        Ok(Box::new(RecordingProcess {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct RecordingProcess {
    shared: Arc<Mutex<LaunchLog>>,
}

impl ProcessHandle for RecordingProcess {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut log = lock(&self.shared);
        if log.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        log.writes.push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        lock(&self.shared).kills += 1;
        Ok(())
    }
}

/// Read access to a [`RecordingLauncher`]'s log.
#[derive(Clone)]
pub struct LaunchHandle {
    shared: Arc<Mutex<LaunchLog>>,
}

impl LaunchHandle {
    /// Every spawn request, oldest first.
    pub fn requests(&self) -> Vec<SpawnRequest> {
        lock(&self.shared).requests.clone()
    }

    /// Programs passed to spawn.
    pub fn programs(&self) -> Vec<PathBuf> {
        self.requests()
            .into_iter()
            .map(|request| request.program)
            .collect()
    }

    /// Raw lines written to stdin, terminators included.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.shared).writes.clone()
    }

    /// Written command texts without their token prefix or terminator.
    pub fn commands(&self) -> Vec<String> {
        self.writes()
            .iter()
            .map(|line| {
                line.get(8..)
                    .unwrap_or_default()
                    .trim_end_matches("\r\n")
                    .to_owned()
            })
            .collect()
    }

    /// How often the process was killed.
    pub fn kills(&self) -> usize {
        lock(&self.shared).kills
    }

    /// Makes every later write fail with a broken pipe.
    pub fn fail_writes(&self) {
        lock(&self.shared).fail_writes = true;
    }
}

fn lock(shared: &Mutex<LaunchLog>) -> std::sync::MutexGuard<'_, LaunchLog> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
