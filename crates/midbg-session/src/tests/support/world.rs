//! BDD world wrapping a session wired to recording doubles.

use std::path::Path;

use tempfile::TempDir;

use crate::backend::DebuggerBackend;
use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::process::ProcessEvent;
use crate::resolve::Environment;
use crate::session::MiSession;

use super::{
    LaunchHandle, Observed, RecordingLauncher, RecordingObserver, discarding_sink,
    missing_resolver, resolving_resolver,
};

/// Session under test plus handles onto everything it touched.
pub struct SessionWorld {
    /// Session under test.
    pub session: MiSession,
    launch: LaunchHandle,
    observer: RecordingObserver,
    /// Error returned by the most recent fallible step.
    pub last_error: Option<SessionError>,
    /// Scratch directory for source files the debugger reports.
    pub sources: TempDir,
    mark: usize,
}

impl SessionWorld {
    /// A world whose debugger resolves and spawns successfully.
    pub fn new() -> Self {
        Self::build(RecordingLauncher::new(), true)
    }

    /// A world whose debugger cannot be found.
    pub fn without_debugger() -> Self {
        Self::build(RecordingLauncher::new(), false)
    }

    fn build(launcher: RecordingLauncher, resolvable: bool) -> Self {
        let launch = launcher.handle();
        let observer = RecordingObserver::default();
        let config = SessionConfig {
            new_console: false,
            ..SessionConfig::default()
        };
        let resolver = if resolvable {
            resolving_resolver()
        } else {
            missing_resolver()
        };
        let mut session = MiSession::new(config, Box::new(launcher), discarding_sink())
            .with_resolver(Box::new(resolver))
            .with_observer(Box::new(observer.clone()));
        session.set_environment(Environment::from([(
            String::from("PATH"),
            String::from("/usr/bin"),
        )]));
        let sources = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create source directory: {error}"),
        };
        Self {
            session,
            launch,
            observer,
            last_error: None,
            sources,
            mark: 0,
        }
    }

    /// Starts debugging a fixed program, recording any error.
    pub fn start(&mut self) {
        self.last_error = self
            .session
            .start(Path::new("/work/hello"), &[String::from("--verbose")])
            .err();
    }

    /// Delivers `text` as one stdout chunk.
    pub fn feed(&mut self, text: &str) {
        self.session
            .handle_event(ProcessEvent::Stdout(text.as_bytes().to_vec()));
    }

    /// Starts the session and answers the whole setup sequence, leaving the
    /// program stopped with nothing in flight.
    pub fn start_and_initialise(&mut self) {
        self.start();
        self.feed("=thread-group-added,id=\"i1\"\n(gdb)\n");
        while self.session.queue().in_flight().is_some() {
            self.feed("^done\n(gdb)\n");
        }
    }

    /// Delivers a process exit.
    pub fn exit(&mut self, code: Option<i32>) {
        self.session.handle_event(ProcessEvent::Exited(code));
    }

    /// Remembers how many commands have been written so far.
    pub fn mark(&mut self) {
        self.mark = self.launch.commands().len();
    }

    /// Commands written since [`SessionWorld::mark`] followed by those still
    /// queued, in the order the debugger will receive them.
    pub fn commands_after_mark(&self) -> Vec<String> {
        let mut commands: Vec<String> = self
            .launch
            .commands()
            .into_iter()
            .skip(self.mark)
            .collect();
        commands.extend(
            self.session
                .queue()
                .pending()
                .map(|command| command.text().to_owned()),
        );
        commands
    }

    /// Handle onto spawns and writes.
    pub const fn launch(&self) -> &LaunchHandle {
        &self.launch
    }

    /// Everything the observer received.
    pub fn observed(&self) -> Observed {
        self.observer.observed()
    }
}
