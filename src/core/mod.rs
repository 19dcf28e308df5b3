//! Core functionality for the vcs-status tool.
//!
//! This module provides the status cache, the path resolver that feeds it, the
//! backend seam with its git implementation, and the CLI support code.

pub mod backend;
pub mod cache;
pub mod colors;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod error;
pub mod file_status;
pub mod git_backend;
pub mod identity;
pub mod indirection;
pub mod notice;
pub mod output;
pub mod refresh_slot;
pub mod resolver;

// === Error handling ===
pub use error::{Result, StatusCacheError};

// === Data model ===
pub use file_status::FileStatus;
pub use identity::FileIdentity;

// === Status cache ===
// Background refresh with single-flight workers and completion events
pub use cache::{
    CacheEvent, CacheState, RefreshBatch, RefreshCompleted, RefreshOutcome, RefreshProgress,
    StatusCache, SubscriptionId, DEFAULT_CHUNK_SIZE,
};
pub use refresh_slot::{RefreshSlot, SlotTicket};

// === Path resolution ===
pub use indirection::{DriveMappings, NoIndirection, PathIndirection, SymlinkIndirection};
pub use resolver::{PathResolver, Resolution};

// === Backends ===
pub use backend::{
    BackendClient, BackendConnector, Connection, InMemoryBackend, ScriptedFailure, ServerProfile,
};
pub use git_backend::{GitBackend, GitConnector};

// === Logging ===
pub use notice::{LogSink, MemorySink, NoticeSink};

// === Settings and command initialization ===
pub use command_init::{WorkspaceContext, WorkspaceInit, WorkspaceOverrides};
pub use config::Settings;

// === Output formatting ===
pub use colors::{format_file_status, get_aligned_status, get_colored_path, get_status_color_style};
pub use output::{print_error, print_section_header, print_success, print_warning};
