//! Client-side path indirection.
//!
//! Some clients see a project through a virtual name: a substituted drive letter on
//! Windows, a symlinked directory on Unix. A [`PathIndirection`] turns such a path back
//! into the real one so root-membership tests compare like with like.
//!
//! # Public API
//! - [`PathIndirection`]: Resolution trait, may fail
//! - [`NoIndirection`]: Returns every path unchanged
//! - [`DriveMappings`]: Table of virtual drive prefixes to real directories
//! - [`SymlinkIndirection`]: Resolves through the filesystem with `canonicalize`

use crate::core::error::{Result, StatusCacheError};
use std::collections::BTreeMap;

/// Resolve a possibly virtual path to its real location.
///
/// Returns the path unchanged when it is not virtual. Errors are allowed; the
/// resolver treats any error as "unchanged".
pub trait PathIndirection: Send + Sync {
    fn resolve(&self, path: &str) -> Result<String>;
}

impl<F> PathIndirection for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn resolve(&self, path: &str) -> Result<String> {
        self(path)
    }
}

/// No indirection at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndirection;

impl PathIndirection for NoIndirection {
    fn resolve(&self, path: &str) -> Result<String> {
        Ok(path.to_string())
    }
}

/// Virtual drive table, e.g. `X:` -> `C:\work\project`.
#[derive(Debug, Default, Clone)]
pub struct DriveMappings {
    // Keyed by upper-cased drive prefix
    drives: BTreeMap<String, String>,
}

impl DriveMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: &BTreeMap<String, String>) -> Self {
        let mut mappings = Self::new();
        for (drive, target) in table {
            mappings.insert(drive, target);
        }
        mappings
    }

    /// Map `drive` (e.g. `"X:"` or `"x:\"`) to the real directory `target`
    pub fn insert(&mut self, drive: &str, target: &str) {
        let drive = drive.trim_end_matches(['\\', '/']).to_uppercase();
        let target = target.trim_end_matches(['\\', '/']).to_string();
        self.drives.insert(drive, target);
    }

    pub fn is_empty(&self) -> bool {
        self.drives.is_empty()
    }
}

impl PathIndirection for DriveMappings {
    fn resolve(&self, path: &str) -> Result<String> {
        let Some(colon) = path.find(':') else {
            return Ok(path.to_string());
        };
        let drive = path[..=colon].to_uppercase();
        match self.drives.get(&drive) {
            Some(target) => Ok(format!("{target}{}", &path[colon + 1..])),
            None => Ok(path.to_string()),
        }
    }
}

/// Filesystem-backed resolution through symlinks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkIndirection;

impl PathIndirection for SymlinkIndirection {
    fn resolve(&self, path: &str) -> Result<String> {
        let real = std::fs::canonicalize(path)
            .map_err(|e| StatusCacheError::indirection(path, e.to_string()))?;
        let mut real = real.to_string_lossy().into_owned();
        // Keep the caller's trailing separator so root strings stay roots
        if (path.ends_with('/') || path.ends_with('\\')) && !real.ends_with(['/', '\\']) {
            real.push(std::path::MAIN_SEPARATOR);
        }
        Ok(real)
    }
}
