//! Registry of debugger backends.

use std::collections::HashMap;

use crate::backend::DebuggerBackend;
use crate::errors::HostError;

/// Owns the registered backends and tracks which one is in use.
///
/// Callers never hold a backend themselves; they borrow it through the
/// host for the duration of a call.
#[derive(Default)]
pub struct DebugHost {
    backends: HashMap<String, Box<dyn DebuggerBackend>>,
    current: Option<String>,
}

impl DebugHost {
    /// Builds an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend under its [`DebuggerBackend::kind`].
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DuplicateBackend`] when the kind is taken.
    pub fn register(&mut self, backend: Box<dyn DebuggerBackend>) -> Result<(), HostError> {
        let kind = backend.kind().to_owned();
        if self.backends.contains_key(&kind) {
            return Err(HostError::duplicate(&kind));
        }
        self.backends.insert(kind, backend);
        Ok(())
    }

    /// Removes and returns a backend, clearing the selection if it was current.
    pub fn remove(&mut self, kind: &str) -> Option<Box<dyn DebuggerBackend>> {
        if self.current.as_deref() == Some(kind) {
            self.current = None;
        }
        self.backends.remove(kind)
    }

    /// Looks up a backend.
    #[must_use]
    pub fn find(&self, kind: &str) -> Option<&dyn DebuggerBackend> {
        self.backends.get(kind).map(AsRef::as_ref)
    }

    /// Registered kinds in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Selects the backend used by [`DebugHost::current_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownBackend`] when nothing is registered
    /// under `kind`.
    pub fn set_current(&mut self, kind: &str) -> Result<(), HostError> {
        if !self.backends.contains_key(kind) {
            return Err(HostError::unknown(kind));
        }
        self.current = Some(kind.to_owned());
        Ok(())
    }

    /// Kind of the selected backend.
    #[must_use]
    pub fn current_kind(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The selected backend.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoCurrentBackend`] when none is selected.
    pub fn current(&self) -> Result<&dyn DebuggerBackend, HostError> {
        let kind = self.current.as_deref().ok_or(HostError::NoCurrentBackend)?;
        self.find(kind).ok_or_else(|| HostError::unknown(kind))
    }

    /// The selected backend, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoCurrentBackend`] when none is selected.
    pub fn current_mut(&mut self) -> Result<&mut dyn DebuggerBackend, HostError> {
        let kind = self.current.as_deref().ok_or(HostError::NoCurrentBackend)?;
        match self.backends.get_mut(kind) {
            Some(backend) => Ok(backend.as_mut()),
            None => Err(HostError::unknown(kind)),
        }
    }
}
