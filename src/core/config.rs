//! Persisted settings.
//!
//! [`Settings`] lives as pretty-printed JSON in `settings.json` inside the per-user
//! configuration directory. A missing file yields defaults; command line flags override
//! individual values for a single invocation.

use crate::core::backend::ServerProfile;
use crate::core::cache::DEFAULT_CHUNK_SIZE;
use crate::core::dirs::get_config_directory;
use crate::core::error::{Result, StatusCacheError};
use crate::core::indirection::DriveMappings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerProfile,
    /// Backend root; defaults to the workspace directory
    pub root: Option<String>,
    /// Stream prefixed to canonical paths; defaults to the current branch
    pub stream: Option<String>,
    /// When false every path counts as under the root
    pub enforce_root: bool,
    pub chunk_size: usize,
    /// Virtual drive prefix to real directory
    pub drive_mappings: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerProfile::default(),
            root: None,
            stream: None,
            enforce_root: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            drive_mappings: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn settings_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join(SETTINGS_FILE))
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| StatusCacheError::settings_read_failed(path, e))?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.chunk_size = settings.chunk_size.max(1);
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn drive_mappings(&self) -> DriveMappings {
        DriveMappings::from_table(&self.drive_mappings)
    }

    /// Root to install: explicit root, else the workspace directory
    pub fn effective_root(&self) -> Option<String> {
        self.root.clone().or_else(|| {
            self.server
                .workspace
                .as_ref()
                .map(|workspace| workspace.to_string_lossy().into_owned())
        })
    }
}
