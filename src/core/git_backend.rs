//! Git implementation of the backend client.
//!
//! [`GitConnector`] opens the repository named by the server profile's workspace and
//! hands out a [`GitBackend`] that answers status queries with `git2`.
//!
//! # Key Features
//! - **Canonical path mapping**: The first segment of a canonical path (stream or root
//!   directory name) is dropped and the root's offset inside the working directory is
//!   joined back, so a root below the repository top level still finds its files
//! - **Status mapping**: git2 flags are converted with [`FileStatus::from_git2`]
//! - **Staleness**: Files changed between HEAD and its upstream branch are reported as
//!   [`FileStatus::CheckedInStale`] when otherwise clean

use crate::core::{
    backend::{BackendClient, BackendConnector, ServerProfile},
    error::{Result, StatusCacheError},
    file_status::FileStatus,
};
use git2::{BranchType, ErrorCode, Repository};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Connects to a local git workspace
#[derive(Debug, Default, Clone)]
pub struct GitConnector {
    /// Backend root; `None` means the working directory itself
    root: Option<PathBuf>,
}

impl GitConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector for a backend root inside the workspace
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Root directory relative to `workdir`, as a `/`-terminated prefix ("" at top level)
    fn root_prefix(&self, workdir: &Path) -> Result<String> {
        let Some(root) = &self.root else {
            return Ok(String::new());
        };
        let real_root = std::fs::canonicalize(root).unwrap_or_else(|_| root.clone());
        let real_workdir =
            std::fs::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());
        let offset = real_root.strip_prefix(&real_workdir).map_err(|_| {
            StatusCacheError::configuration(format!(
                "backend root '{}' is outside the workspace '{}'",
                root.display(),
                workdir.display()
            ))
        })?;

        let mut prefix = String::new();
        for component in offset.components() {
            prefix.push_str(&component.as_os_str().to_string_lossy());
            prefix.push('/');
        }
        Ok(prefix)
    }
}

impl BackendConnector for GitConnector {
    fn connect(&self, profile: &ServerProfile) -> Result<Box<dyn BackendClient>> {
        let workspace = profile
            .workspace
            .as_ref()
            .ok_or_else(|| StatusCacheError::configuration("no workspace configured"))?;

        let repo = Repository::open(workspace).map_err(|e| {
            StatusCacheError::configuration(format!(
                "'{}' is not a git workspace: {}",
                workspace.display(),
                e.message()
            ))
        })?;
        if repo.is_bare() {
            return Err(StatusCacheError::configuration(format!(
                "'{}' is a bare repository",
                workspace.display()
            )));
        }

        let prefix = match repo.workdir() {
            Some(workdir) => self.root_prefix(workdir)?,
            None => String::new(),
        };
        let stale = stale_paths(&repo)?;
        log::debug!(
            "Opened git workspace {} (root prefix '{}', {} paths behind upstream)",
            workspace.display(),
            prefix,
            stale.len()
        );
        Ok(Box::new(GitBackend {
            repo: Some(repo),
            prefix,
            stale,
        }))
    }
}

/// Status queries against one open repository
pub struct GitBackend {
    repo: Option<Repository>,
    /// Root offset inside the working directory, `/`-terminated or empty
    prefix: String,
    stale: HashSet<String>,
}

impl BackendClient for GitBackend {
    fn resolve_statuses(
        &mut self,
        canonical_paths: &[String],
    ) -> Result<HashMap<String, FileStatus>> {
        let repo = self
            .repo
            .as_ref()
            .ok_or_else(|| StatusCacheError::connection("git workspace already closed"))?;

        let mut result = HashMap::with_capacity(canonical_paths.len());
        for canonical in canonical_paths {
            let under_root = root_relative(canonical);
            let status = if under_root.is_empty() {
                FileStatus::CheckedInCurrent
            } else {
                let relative = format!("{}{}", self.prefix, under_root);
                match repo.status_file(Path::new(&relative)) {
                    Ok(flags) => {
                        let status = FileStatus::from_git2(flags);
                        if status == FileStatus::CheckedInCurrent
                            && self.stale.contains(&relative)
                        {
                            FileStatus::CheckedInStale
                        } else {
                            status
                        }
                    }
                    Err(e)
                        if matches!(
                            e.code(),
                            ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::Invalid
                        ) =>
                    {
                        FileStatus::NotInBackend
                    }
                    Err(e) => {
                        return Err(StatusCacheError::connection(format!(
                            "git status failed for '{relative}': {}",
                            e.message()
                        )))
                    }
                }
            };
            result.insert(canonical.clone(), status);
        }
        Ok(result)
    }

    fn disconnect(&mut self) {
        self.repo = None;
    }
}

/// Drop the leading stream or root segment of a canonical path
fn root_relative(canonical: &str) -> &str {
    match canonical.split_once('/') {
        Some((_, rest)) => rest,
        None => "",
    }
}

/// Working directory of the repository containing `path`
pub fn discover_workspace(path: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(path).map_err(|_| StatusCacheError::NotInWorkspace)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or(StatusCacheError::NotInWorkspace)
}

/// Name of the checked-out branch, `None` for a detached or unborn HEAD
pub fn current_branch(workspace: &Path) -> Result<Option<String>> {
    let repo = Repository::discover(workspace)?;
    let head = match repo.head() {
        Ok(head) => head,
        Err(_) => return Ok(None),
    };
    if !head.is_branch() {
        return Ok(None);
    }
    Ok(head.shorthand().map(str::to_string))
}

/// Paths that differ between HEAD and its upstream branch
fn stale_paths(repo: &Repository) -> Result<HashSet<String>> {
    let mut stale = HashSet::new();

    let head = match repo.head() {
        Ok(head) => head,
        Err(_) => return Ok(stale),
    };
    let Some(branch_name) = head.shorthand() else {
        return Ok(stale);
    };
    let local_branch = match repo.find_branch(branch_name, BranchType::Local) {
        Ok(branch) => branch,
        Err(_) => return Ok(stale),
    };
    let upstream = match local_branch.upstream() {
        Ok(upstream) => upstream,
        Err(_) => return Ok(stale), // No upstream configured
    };

    let head_tree = head.peel_to_tree()?;
    let upstream_tree = upstream.get().peel_to_tree()?;
    let diff = repo.diff_tree_to_tree(Some(&head_tree), Some(&upstream_tree), None)?;
    for delta in diff.deltas() {
        for file in [delta.old_file(), delta.new_file()] {
            if let Some(path) = file.path().and_then(|p| p.to_str()) {
                stale.insert(path.replace('\\', "/"));
            }
        }
    }
    Ok(stale)
}
