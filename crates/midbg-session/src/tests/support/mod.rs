//! Shared fixtures and doubles for session tests.

mod recording_launcher;
mod recording_observer;
mod world;

use std::path::PathBuf;
use std::sync::Arc;

use mockall::mock;

use crate::process::EventSink;
use crate::resolve::{Environment, ExecutableResolver};

pub use recording_launcher::{LaunchHandle, RecordingLauncher};
pub use recording_observer::{Observed, RecordingObserver};
pub use world::SessionWorld;

/// Absolute path the resolver doubles hand out for the debugger.
pub const DEBUGGER_PATH: &str = "/opt/debuggers/gdb";

mock! {
    pub Resolver {}
    impl ExecutableResolver for Resolver {
        fn resolve(&self, tool: &str, environment: &Environment) -> Option<PathBuf>;
    }
}

/// Resolver that finds the debugger at [`DEBUGGER_PATH`] any number of times.
pub fn resolving_resolver() -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_, _| Some(PathBuf::from(DEBUGGER_PATH)));
    resolver
}

/// Resolver that never finds anything.
pub fn missing_resolver() -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver.expect_resolve().times(1).returning(|_, _| None);
    resolver
}

/// Sink that drops every event; tests feed events to the session directly.
pub fn discarding_sink() -> EventSink {
    Arc::new(|_| {})
}
