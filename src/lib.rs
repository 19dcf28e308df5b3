//! VCS Status Cache - a live, non-blocking view of version-control status for large
//! project trees.
//!
//! The library keeps a map from every requested file to its last-known versioning
//! state and refreshes it in the background, one worker at a time, in bounded chunks.
//! Paths are translated to the backend's form by a memoizing resolver that follows
//! virtual drives and symlinked roots.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - [`StatusCache`]: lookup, background refresh, "wait until current"
//! - [`PathResolver`]: root installation and canonical path resolution
//! - [`BackendConnector`] / [`BackendClient`]: the backend seam, with [`GitConnector`]
//! - [`NoticeSink`]: injected logging interface
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use vcs_status_cache::{
//!     GitConnector, LogSink, PathResolver, RefreshBatch, ServerProfile, StatusCache,
//!     SymlinkIndirection,
//! };
//!
//! let resolver = Arc::new(PathResolver::new(Arc::new(SymlinkIndirection), LogSink::shared()));
//! resolver.set_root("/work/project");
//! let cache: StatusCache = StatusCache::new(
//!     resolver,
//!     Arc::new(GitConnector::new()),
//!     ServerProfile::for_workspace("/work/project"),
//!     LogSink::shared(),
//! );
//! cache.initialize(RefreshBatch::of(["/work/project/src/main.rs"]))?;
//! cache.wait_until_current();
//! # Ok::<(), vcs_status_cache::StatusCacheError>(())
//! ```

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Backends
    BackendClient,
    BackendConnector,
    // Status cache
    CacheEvent,
    CacheState,
    // Path resolution
    DriveMappings,
    // Data model
    FileIdentity,
    FileStatus,
    GitConnector,
    InMemoryBackend,
    // Logging
    LogSink,
    MemorySink,
    NoIndirection,
    NoticeSink,
    PathIndirection,
    PathResolver,
    RefreshBatch,
    RefreshCompleted,
    RefreshOutcome,
    RefreshProgress,
    Resolution,
    // Error handling
    Result,
    ServerProfile,
    Settings,
    StatusCache,
    StatusCacheError,
    SymlinkIndirection,
};
