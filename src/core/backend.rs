//! Backend client seam.
//!
//! The cache never talks to a versioning server directly. It asks a
//! [`BackendConnector`] for a fresh [`BackendClient`] at the start of every refresh run
//! and wraps it in a [`Connection`], which disconnects on every exit path.
//!
//! # Public API
//! - [`ServerProfile`]: Where the backend lives
//! - [`BackendConnector`] / [`BackendClient`]: Connection factory and per-run client
//! - [`Connection`]: Guard that always disconnects
//! - [`InMemoryBackend`]: Scriptable in-process backend for offline use and tests

use crate::core::error::{Result, StatusCacheError};
use crate::core::file_status::FileStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Connection profile for a backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    /// Local workspace the backend serves (for git, the repository directory)
    pub workspace: Option<PathBuf>,
    /// Server address, for backends that have one
    pub server: Option<String>,
}

impl ServerProfile {
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: Some(workspace.into()),
            server: None,
        }
    }
}

/// A live backend session used by exactly one refresh run.
pub trait BackendClient: Send {
    /// Status for each canonical path. May fail for the whole request.
    fn resolve_statuses(&mut self, canonical_paths: &[String])
        -> Result<HashMap<String, FileStatus>>;

    /// Release the session
    fn disconnect(&mut self);
}

/// Opens backend sessions
pub trait BackendConnector: Send + Sync {
    fn connect(&self, profile: &ServerProfile) -> Result<Box<dyn BackendClient>>;
}

/// Owned backend session that disconnects when dropped
pub struct Connection {
    client: Box<dyn BackendClient>,
}

impl Connection {
    pub fn open(connector: &dyn BackendConnector, profile: &ServerProfile) -> Result<Self> {
        let client = connector.connect(profile)?;
        log::debug!("Backend connection opened");
        Ok(Self { client })
    }

    pub fn resolve_statuses(
        &mut self,
        canonical_paths: &[String],
    ) -> Result<HashMap<String, FileStatus>> {
        self.client.resolve_statuses(canonical_paths)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.client.disconnect();
        log::debug!("Backend connection closed");
    }
}

/// Scripted failure for [`InMemoryBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// `connect` fails with a configuration error
    Connect,
    /// The n-th `resolve_statuses` call (1-based) fails with a connection error
    Call(usize),
    /// The n-th `resolve_statuses` call (1-based) panics
    Panic(usize),
}

type CallHook = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
struct InMemoryState {
    statuses: Mutex<HashMap<String, FileStatus>>,
    calls: Mutex<Vec<Vec<String>>>,
    failure: Mutex<Option<ScriptedFailure>>,
    hook: Mutex<Option<CallHook>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

/// In-process backend holding a fixed table of canonical path statuses.
///
/// Paths missing from the table report [`FileStatus::NotInBackend`]. Clones share
/// the same table and call log.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<InMemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, canonical_path: impl Into<String>, status: FileStatus) {
        if let Ok(mut statuses) = self.state.statuses.lock() {
            statuses.insert(canonical_path.into(), status);
        }
    }

    pub fn fail_with(&self, failure: Option<ScriptedFailure>) {
        if let Ok(mut slot) = self.state.failure.lock() {
            *slot = failure;
        }
    }

    /// Run `hook` with the 1-based call number before each `resolve_statuses` call
    pub fn on_call(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.state.hook.lock() {
            *slot = Some(Arc::new(hook));
        }
    }

    /// Paths passed to each `resolve_statuses` call so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state
            .calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Sizes of each `resolve_statuses` request so far
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(Vec::len).collect()
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.state.disconnects.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Option<ScriptedFailure> {
        self.state.failure.lock().ok().and_then(|failure| *failure)
    }
}

impl BackendConnector for InMemoryBackend {
    fn connect(&self, _profile: &ServerProfile) -> Result<Box<dyn BackendClient>> {
        if self.failure() == Some(ScriptedFailure::Connect) {
            return Err(StatusCacheError::configuration("scripted connect failure"));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryClient {
            backend: self.clone(),
        }))
    }
}

struct InMemoryClient {
    backend: InMemoryBackend,
}

impl BackendClient for InMemoryClient {
    fn resolve_statuses(
        &mut self,
        canonical_paths: &[String],
    ) -> Result<HashMap<String, FileStatus>> {
        let state = &self.backend.state;
        let call = {
            let mut calls = state
                .calls
                .lock()
                .map_err(|_| StatusCacheError::connection("call log poisoned"))?;
            calls.push(canonical_paths.to_vec());
            calls.len()
        };

        let hook = state.hook.lock().ok().and_then(|hook| hook.clone());
        if let Some(hook) = hook {
            hook(call);
        }

        match self.backend.failure() {
            Some(ScriptedFailure::Call(n)) if n == call => {
                return Err(StatusCacheError::connection(format!(
                    "scripted failure on call {call}"
                )));
            }
            Some(ScriptedFailure::Panic(n)) if n == call => {
                panic!("scripted panic on call {call}");
            }
            _ => {}
        }

        let statuses = state
            .statuses
            .lock()
            .map_err(|_| StatusCacheError::connection("status table poisoned"))?;
        Ok(canonical_paths
            .iter()
            .map(|path| {
                let status = statuses
                    .get(path)
                    .copied()
                    .unwrap_or(FileStatus::NotInBackend);
                (path.clone(), status)
            })
            .collect())
    }

    fn disconnect(&mut self) {
        self.backend.state.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}
