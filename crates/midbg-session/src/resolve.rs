//! Locating the debugger executable.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

const RESOLVE_TARGET: &str = "midbg_session::resolve";

/// Environment variables handed to the debugger, keyed by name.
pub type Environment = BTreeMap<String, String>;

/// Turns a logical tool name into an executable path.
pub trait ExecutableResolver {
    /// Resolves `tool` using the `PATH` of `environment`.
    fn resolve(&self, tool: &str, environment: &Environment) -> Option<PathBuf>;
}

/// Searches the directories listed in the environment's `PATH`.
///
/// Names containing a path separator are resolved relative to the current
/// directory instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ExecutableResolver for PathResolver {
    fn resolve(&self, tool: &str, environment: &Environment) -> Option<PathBuf> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let search_path = environment.get("PATH");
        match which::which_in(tool, search_path, &cwd) {
            Ok(path) => Some(path),
            Err(error) => {
                debug!(
                    target: RESOLVE_TARGET,
                    tool,
                    cwd = %cwd.display(),
                    %error,
                    "debugger executable not resolved"
                );
                None
            }
        }
    }
}

/// The caller's own environment, used when no explicit one was set.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[must_use]
pub fn inherited_environment() -> Environment {
    env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Runtime source directory derived from `GOROOT`, if set.
#[must_use]
pub fn runtime_from_goroot(environment: &Environment) -> Option<PathBuf> {
    environment
        .get("GOROOT")
        .filter(|root| !root.is_empty())
        .map(|root| Path::new(root).join("src").join("pkg").join("runtime"))
}
