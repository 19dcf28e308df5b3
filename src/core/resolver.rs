//! Client path to backend path translation.
//!
//! [`PathResolver`] canonicalizes client-reported paths against the configured backend
//! root, following client-side path indirection (virtual drives, symlinked roots) when a
//! path does not sit directly under the root. Every outcome, including failures, is
//! memoized per [`FileIdentity`] until the root or stream changes, so the indirection
//! lookup runs at most once per distinct path.
//!
//! # Canonical path form
//! The path is taken relative to the root's parent directory and joined with forward
//! slashes, so its first segment is the root directory's own name. When a stream is
//! active that first segment is replaced by the stream name:
//!
//! ```text
//! root   C:\proj\          stream  main
//! client C:\proj\src\a.cs  ->      main/src/a.cs
//! ```
//!
//! Root and client paths are compared ASCII case-insensitively.

use crate::core::identity::FileIdentity;
use crate::core::indirection::PathIndirection;
use crate::core::notice::NoticeSink;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Outcome of resolving one client path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Backend path, or the original client path when not under the root
    pub canonical: String,
    /// Whether the path falls under the backend root
    pub under_root: bool,
    /// Human-readable reason when the path could not be mapped under the root
    pub warning: Option<String>,
}

impl Resolution {
    fn unresolved(path: &str, warning: Option<String>) -> Self {
        Self {
            canonical: path.to_string(),
            under_root: false,
            warning,
        }
    }
}

#[derive(Debug, Clone)]
struct RootInfo {
    /// Root as installed, normalized, with trailing separator
    root: String,
    /// Root after indirection, with trailing separator
    actual_root: String,
    /// Parent of the actual root, with trailing separator; `None` for a drive or fs root
    parent: Option<String>,
    separator: char,
}

#[derive(Debug, Default)]
struct ResolverState {
    root: Option<RootInfo>,
    stream: Option<String>,
    // Canonical path and membership live in one entry so they are invalidated together
    memo: HashMap<FileIdentity, Resolution>,
    generation: u64,
}

/// Canonicalizes client paths against a backend root.
pub struct PathResolver {
    indirection: Arc<dyn PathIndirection>,
    sink: Arc<dyn NoticeSink>,
    enforce_root: bool,
    state: RwLock<ResolverState>,
}

impl PathResolver {
    pub fn new(indirection: Arc<dyn PathIndirection>, sink: Arc<dyn NoticeSink>) -> Self {
        Self {
            indirection,
            sink,
            enforce_root: true,
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// When disabled, [`PathResolver::is_under_root`] always answers true
    pub fn with_root_enforcement(mut self, enforce_root: bool) -> Self {
        self.enforce_root = enforce_root;
        self
    }

    /// Install a new backend root.
    ///
    /// Memoized resolutions are dropped when the root actually changes.
    pub fn set_root(&self, root: &str) {
        let trimmed = root.trim();
        if trimmed.is_empty() {
            self.clear_root();
            return;
        }

        let separator = separator_for(trimmed);
        let normalized = with_trailing_separator(&with_separator(trimmed, separator), separator);
        if normalized != root {
            self.sink.info(&format!(
                "Backend root '{root}' adjusted to '{normalized}'"
            ));
        }

        let actual_root = match self.indirection.resolve(&normalized) {
            Ok(actual) if !actual.trim().is_empty() => {
                with_trailing_separator(&with_separator(actual.trim(), separator), separator)
            }
            Ok(_) => normalized.clone(),
            Err(e) => {
                self.sink
                    .warn(&format!("Could not resolve backend root '{normalized}': {e}"));
                normalized.clone()
            }
        };
        let parent = parent_of(&actual_root, separator);

        let info = RootInfo {
            root: normalized,
            actual_root,
            parent,
            separator,
        };

        let mut state = self.write_state();
        let changed = state
            .root
            .as_ref()
            .map(|previous| {
                !previous.root.eq_ignore_ascii_case(&info.root)
                    || !previous.actual_root.eq_ignore_ascii_case(&info.actual_root)
            })
            .unwrap_or(true);
        if changed {
            state.memo.clear();
            state.generation += 1;
            self.sink
                .info(&format!("Backend root changed to '{}'", info.root));
        }
        state.root = Some(info);
    }

    /// Remove the backend root; every path resolves to itself afterwards
    pub fn clear_root(&self) {
        let mut state = self.write_state();
        if state.root.take().is_some() {
            state.memo.clear();
            state.generation += 1;
            self.sink.info("Backend root cleared");
        }
    }

    /// Set the active stream (branch) name prefixed to canonical paths
    pub fn set_stream(&self, stream: Option<&str>) {
        let stream = stream
            .map(|s| s.trim().trim_matches('/').to_string())
            .filter(|s| !s.is_empty());
        let mut state = self.write_state();
        if state.stream != stream {
            state.stream = stream;
            state.memo.clear();
            state.generation += 1;
        }
    }

    /// Installed root, normalized with trailing separator
    pub fn root(&self) -> Option<String> {
        self.read_state().root.as_ref().map(|r| r.root.clone())
    }

    /// Root after indirection
    pub fn actual_root(&self) -> Option<String> {
        self.read_state().root.as_ref().map(|r| r.actual_root.clone())
    }

    pub fn stream(&self) -> Option<String> {
        self.read_state().stream.clone()
    }

    /// Resolve a client path to its canonical backend form.
    ///
    /// Never fails: paths that cannot be mapped come back unchanged with a warning.
    pub fn resolve(&self, client_path: &str) -> Resolution {
        let identity = FileIdentity::new(client_path);

        let (root, stream, generation) = {
            let state = self.read_state();
            if let Some(hit) = state.memo.get(&identity) {
                return hit.clone();
            }
            (state.root.clone(), state.stream.clone(), state.generation)
        };

        let resolution = match root {
            None => Resolution::unresolved(client_path, None),
            Some(root) => self.resolve_under(&root, stream.as_deref(), client_path),
        };

        if let Some(warning) = &resolution.warning {
            self.sink.warn(warning);
        }

        let mut state = self.write_state();
        // A root or stream change while we were resolving makes this result stale
        if state.generation == generation {
            state.memo.insert(identity, resolution.clone());
        }
        resolution
    }

    /// Direct membership test against the current root.
    pub fn is_under_root(&self, client_path: &str) -> bool {
        if !self.enforce_root {
            return true;
        }
        let state = self.read_state();
        match &state.root {
            Some(root) => {
                let path = with_separator(client_path.trim(), root.separator);
                relative_to(&path, &root.actual_root, root.separator).is_some()
                    || relative_to(&path, &root.root, root.separator).is_some()
            }
            None => false,
        }
    }

    /// Memoized membership from an earlier [`PathResolver::resolve`]; false if never resolved
    pub fn was_resolved_under_root(&self, client_path: &str) -> bool {
        self.read_state()
            .memo
            .get(&FileIdentity::new(client_path))
            .map(|r| r.under_root)
            .unwrap_or(false)
    }

    /// Number of memoized resolutions
    pub fn memoized_len(&self) -> usize {
        self.read_state().memo.len()
    }

    fn resolve_under(&self, root: &RootInfo, stream: Option<&str>, client_path: &str) -> Resolution {
        let path = with_separator(client_path.trim(), root.separator);
        if relative_to(&path, &root.actual_root, root.separator).is_some() {
            return canonical_resolution(root, stream, &path);
        }

        // The client path itself may sit on a virtual drive
        let real = match self.indirection.resolve(&path) {
            Ok(real) => with_separator(real.trim(), root.separator),
            Err(e) => {
                self.sink.error(&format!(
                    "Path indirection lookup failed for '{client_path}': {e}"
                ));
                path.clone()
            }
        };
        if real != path && relative_to(&real, &root.actual_root, root.separator).is_some() {
            return canonical_resolution(root, stream, &real);
        }

        Resolution::unresolved(
            client_path,
            Some(format!(
                "'{client_path}' is not under the backend root '{}'",
                root.root
            )),
        )
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("PathResolver")
            .field("root", &state.root)
            .field("stream", &state.stream)
            .field("memoized", &state.memo.len())
            .field("enforce_root", &self.enforce_root)
            .finish()
    }
}

impl PathResolver {
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ResolverState> {
        // Memo entries are plain data; a panic elsewhere cannot leave them half-written
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, ResolverState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn canonical_resolution(root: &RootInfo, stream: Option<&str>, path: &str) -> Resolution {
    Resolution {
        canonical: canonical_path(root, stream, path),
        under_root: true,
        warning: None,
    }
}

/// Build the backend form of `path`, which must already be known to sit under the root
fn canonical_path(root: &RootInfo, stream: Option<&str>, path: &str) -> String {
    let (relative, keeps_root_segment) = match &root.parent {
        Some(parent) => (relative_to(path, parent, root.separator), true),
        None => (relative_to(path, &root.actual_root, root.separator), false),
    };
    let relative = relative.unwrap_or(path);
    let mut segments: Vec<&str> = relative
        .split(root.separator)
        .filter(|segment| !segment.is_empty())
        .collect();

    if let Some(stream) = stream {
        if keeps_root_segment && !segments.is_empty() {
            segments.remove(0);
        }
        segments.insert(0, stream);
    }
    segments.join("/")
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn separator_for(path: &str) -> char {
    if path.contains('\\') || has_drive_prefix(path) {
        '\\'
    } else {
        '/'
    }
}

fn with_separator(path: &str, separator: char) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { separator } else { c })
        .collect()
}

fn with_trailing_separator(path: &str, separator: char) -> String {
    if path.ends_with(separator) {
        path.to_string()
    } else {
        format!("{path}{separator}")
    }
}

/// `dir` must end with `separator`. Returns the remainder of `path` below `dir`, or an
/// empty remainder when `path` names `dir` itself.
fn relative_to<'a>(path: &'a str, dir: &str, separator: char) -> Option<&'a str> {
    let len = dir.len();
    if path.len() >= len && path.is_char_boundary(len) && path[..len].eq_ignore_ascii_case(dir) {
        return Some(&path[len..]);
    }
    let bare = dir.trim_end_matches(separator);
    if !bare.is_empty() && path.eq_ignore_ascii_case(bare) {
        return Some("");
    }
    None
}

fn parent_of(dir: &str, separator: char) -> Option<String> {
    let bare = dir.trim_end_matches(separator);
    let cut = bare.rfind(separator)?;
    Some(bare[..=cut].to_string())
}
